pub mod inventory;
pub mod prescription;
pub mod replenishment;

pub use inventory::{Medicine, MedicineInventory};
pub use prescription::{
    DispenseReport, Prescription, PrescriptionItem, PrescriptionLedger, PrescriptionStatus,
};
pub use replenishment::{ReplenishmentRegistry, ReplenishmentRequest};
