use serde::{Deserialize, Serialize};
use tracing::info;

use super::inventory::{Medicine, MedicineInventory};
use crate::error::{HmsError, HmsResult};
use crate::ids::generate_id;

/// A pharmacist's request to restock one medicine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentRequest {
    pub id: String,
    pub medicine: String,
    pub requested_amount: u32,
    pub requester_id: String,
    pub requester_name: String,
    approved: bool,
}

impl ReplenishmentRequest {
    pub fn is_approved(&self) -> bool {
        self.approved
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplenishmentRegistry {
    requests: Vec<ReplenishmentRequest>,
}

impl ReplenishmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files an unapproved request and returns its id. Never fails.
    pub fn create(&mut self, medicine: &Medicine, amount: u32, requester_id: &str, requester_name: &str) -> String {
        let id = generate_id("R", |candidate| self.requests.iter().any(|r| r.id == candidate));
        self.requests.push(ReplenishmentRequest {
            id: id.clone(),
            medicine: medicine.name().to_string(),
            requested_amount: amount,
            requester_id: requester_id.to_string(),
            requester_name: requester_name.to_string(),
            approved: false,
        });
        info!(request = %id, medicine = %medicine.name(), amount, requester = %requester_id, "replenishment requested");
        id
    }

    /// Approves a pending request and restocks its medicine. Returns the new
    /// stock level.
    pub fn approve(&mut self, request_id: &str, inventory: &mut MedicineInventory) -> HmsResult<u32> {
        let index = self
            .requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| HmsError::not_found(format!("replenishment request {}", request_id)))?;
        let request = &mut self.requests[index];
        if request.approved {
            return Err(HmsError::conflict(format!("request {} is already approved", request_id)));
        }
        if !inventory.contains(&request.medicine) {
            return Err(HmsError::not_found(format!("{} in inventory", request.medicine)));
        }

        request.approved = true;
        let stock = inventory.replenish(&request.medicine, request.requested_amount)?;
        info!(request = %request_id, medicine = %request.medicine, stock, "replenishment approved");
        Ok(stock)
    }

    pub fn find(&self, request_id: &str) -> Option<&ReplenishmentRequest> {
        self.requests.iter().find(|r| r.id == request_id)
    }

    pub fn pending(&self) -> Vec<&ReplenishmentRequest> {
        self.requests.iter().filter(|r| !r.approved).collect()
    }

    pub fn all(&self) -> &[ReplenishmentRequest] {
        &self.requests
    }

    pub fn has_pending_for(&self, medicine: &str) -> bool {
        self.requests
            .iter()
            .any(|r| !r.approved && r.medicine.eq_ignore_ascii_case(medicine.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_restocks_exactly_once() {
        let mut inventory = MedicineInventory::new();
        inventory.add("Paracetamol", 5, 10).unwrap();
        let mut registry = ReplenishmentRegistry::new();
        let medicine = inventory.find("Paracetamol").unwrap().clone();

        let id = registry.create(&medicine, 20, "PH1", "Mark");
        assert!(id.starts_with('R'));
        assert!(registry.has_pending_for("paracetamol"));

        assert_eq!(registry.approve(&id, &mut inventory).unwrap(), 25);
        assert!(registry.find(&id).unwrap().is_approved());
        let again = registry.approve(&id, &mut inventory);
        assert!(matches!(again, Err(HmsError::Conflict(_))));
        assert_eq!(inventory.find("Paracetamol").unwrap().stock(), 25);
        assert!(registry.pending().is_empty());
    }

    #[test]
    fn unknown_request_is_not_found() {
        let mut inventory = MedicineInventory::new();
        let mut registry = ReplenishmentRegistry::new();
        assert!(matches!(
            registry.approve("R000001", &mut inventory),
            Err(HmsError::NotFound(_))
        ));
    }

    #[test]
    fn request_for_removed_medicine_stays_pending() {
        let mut inventory = MedicineInventory::new();
        inventory.add("Amoxicillin", 0, 5).unwrap();
        let mut registry = ReplenishmentRegistry::new();
        let medicine = inventory.find("Amoxicillin").unwrap().clone();
        let id = registry.create(&medicine, 10, "PH1", "Mark");
        inventory.remove("Amoxicillin").unwrap();

        assert!(registry.approve(&id, &mut inventory).is_err());
        assert!(!registry.find(&id).unwrap().is_approved());
    }
}
