use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::inventory::MedicineInventory;
use crate::error::{HmsError, HmsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionStatus {
    Pending,
    Dispensed,
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrescriptionStatus::Pending => f.write_str("Pending"),
            PrescriptionStatus::Dispensed => f.write_str("Dispensed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub medicine: String,
    pub quantity: u32,
}

impl PrescriptionItem {
    pub fn new(medicine: impl Into<String>, quantity: u32) -> Self {
        Self {
            medicine: medicine.into(),
            quantity,
        }
    }
}

/// Medicines paired with quantities. Keeping each pair in one item makes
/// the two lists impossible to misalign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    id: String,
    items: Vec<PrescriptionItem>,
    status: PrescriptionStatus,
}

impl Prescription {
    pub fn new(id: impl Into<String>, items: Vec<PrescriptionItem>) -> HmsResult<Self> {
        let id = id.into();
        if items.is_empty() {
            return Err(HmsError::validation(format!("prescription {} has no medicines", id)));
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0) {
            return Err(HmsError::validation(format!(
                "quantity of {} must be greater than zero",
                item.medicine
            )));
        }
        Ok(Self {
            id,
            items,
            status: PrescriptionStatus::Pending,
        })
    }

    /// Builds from separate medicine and quantity lists, which must line up.
    pub fn from_parallel(id: impl Into<String>, medicines: Vec<String>, quantities: Vec<u32>) -> HmsResult<Self> {
        if medicines.len() != quantities.len() {
            return Err(HmsError::validation(format!(
                "{} medicines but {} quantities",
                medicines.len(),
                quantities.len()
            )));
        }
        let items = medicines
            .into_iter()
            .zip(quantities)
            .map(|(medicine, quantity)| PrescriptionItem { medicine, quantity })
            .collect();
        Self::new(id, items)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[PrescriptionItem] {
        &self.items
    }

    pub fn status(&self) -> PrescriptionStatus {
        self.status
    }
}

/// What a successful dispense did to the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispenseReport {
    pub deducted: Vec<PrescriptionItem>,
    /// Medicines at or below their alert level after deduction.
    pub needs_replenishment: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionLedger {
    prescriptions: Vec<Prescription>,
}

impl PrescriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, prescription: Prescription) -> HmsResult<()> {
        if self.find(prescription.id()).is_some() {
            return Err(HmsError::conflict(format!(
                "prescription {} already exists",
                prescription.id()
            )));
        }
        info!(prescription = %prescription.id(), items = prescription.items().len(), "prescription added");
        self.prescriptions.push(prescription);
        Ok(())
    }

    /// A copy of every prescription; changing it does not touch the ledger.
    pub fn all(&self) -> Vec<Prescription> {
        self.prescriptions.clone()
    }

    pub fn pending(&self) -> Vec<&Prescription> {
        self.prescriptions
            .iter()
            .filter(|p| p.status == PrescriptionStatus::Pending)
            .collect()
    }

    pub fn find(&self, prescription_id: &str) -> Option<&Prescription> {
        self.prescriptions.iter().find(|p| p.id == prescription_id)
    }

    pub fn contains(&self, prescription_id: &str) -> bool {
        self.find(prescription_id).is_some()
    }

    /// Marks the prescription Dispensed, then deducts each item in order.
    ///
    /// The status flips before any stock moves and deductions are not rolled
    /// back: if a later item is short, earlier items stay deducted, the
    /// prescription stays Dispensed and `InsufficientStock` is returned.
    pub fn dispense(&mut self, prescription_id: &str, inventory: &mut MedicineInventory) -> HmsResult<DispenseReport> {
        let prescription = self
            .prescriptions
            .iter_mut()
            .find(|p| p.id == prescription_id)
            .ok_or_else(|| HmsError::not_found(format!("prescription {}", prescription_id)))?;
        if prescription.status == PrescriptionStatus::Dispensed {
            return Err(HmsError::conflict(format!(
                "prescription {} was already dispensed",
                prescription_id
            )));
        }

        prescription.status = PrescriptionStatus::Dispensed;
        let mut report = DispenseReport::default();
        for item in &prescription.items {
            if let Err(err) = inventory.deduct(&item.medicine, item.quantity) {
                warn!(prescription = %prescription_id, medicine = %item.medicine, error = %err, "dispense stopped part way");
                return Err(err);
            }
            report.deducted.push(item.clone());
            if inventory.needs_replenishment(&item.medicine)? {
                warn!(medicine = %item.medicine, "stock at or below alert level, replenishment needed");
                report.needs_replenishment.push(item.medicine.clone());
            }
        }

        info!(prescription = %prescription_id, "prescription dispensed");
        Ok(report)
    }
}
