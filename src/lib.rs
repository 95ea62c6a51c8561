//! Appointment scheduling, medical records and pharmacy stock for a small
//! hospital, held in memory and loaded from flat files.

pub mod config;
pub mod display;
pub mod error;
pub mod hospital;
mod ids;
pub mod parser;
pub mod patient;
pub mod pharmacy;
pub mod roles;
pub mod schedule;

pub use config::Config;
pub use error::{HmsError, HmsResult};
pub use hospital::Hospital;
pub use patient::{Diagnosis, MedicalRecord, Patient, PatientDirectory, Treatment};
pub use roles::{Caller, Capability, Role, StaffMember};
