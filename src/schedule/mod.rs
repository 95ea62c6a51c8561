pub mod doctor;
pub mod lifecycle;
pub mod slot_utils;
pub mod types;

pub use doctor::{Doctor, DoctorDirectory};
pub use lifecycle::{AppointmentEngine, Schedulable};
pub use slot_utils::{day_slots, parse_date, parse_slot};
pub use types::{Appointment, AppointmentOutcome, AppointmentStatus, TimeSlot};
