use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HmsError, HmsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    name: String,
    stock: u32,
    alert_level: u32,
}

impl Medicine {
    pub fn new(name: impl Into<String>, stock: u32, alert_level: u32) -> Self {
        Self {
            name: name.into(),
            stock,
            alert_level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn alert_level(&self) -> u32 {
        self.alert_level
    }

    /// True once stock has fallen to the alert level or below.
    pub fn needs_replenishment(&self) -> bool {
        self.stock <= self.alert_level
    }

    pub fn deduct_stock(&mut self, quantity: u32) -> HmsResult<u32> {
        if quantity > self.stock {
            return Err(HmsError::InsufficientStock {
                medicine: self.name.clone(),
                requested: quantity,
                available: self.stock,
            });
        }
        self.stock -= quantity;
        Ok(self.stock)
    }

    pub fn replenish(&mut self, amount: u32) -> u32 {
        self.stock = self.stock.saturating_add(amount);
        self.stock
    }
}

/// Medicine stock keyed by case-insensitive name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineInventory {
    medicines: Vec<Medicine>,
}

impl MedicineInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn add(&mut self, name: &str, stock: u32, alert_level: u32) -> HmsResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HmsError::validation("medicine name is required"));
        }
        if self.find(name).is_some() {
            return Err(HmsError::conflict(format!("{} already exists", name)));
        }
        self.medicines.push(Medicine::new(name, stock, alert_level));
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Medicine> {
        self.medicines.iter_mut().find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn get_mut(&mut self, name: &str) -> HmsResult<&mut Medicine> {
        self.find_mut(name)
            .ok_or_else(|| HmsError::not_found(format!("{} in inventory", name)))
    }

    pub fn needs_replenishment(&self, name: &str) -> HmsResult<bool> {
        self.find(name)
            .map(Medicine::needs_replenishment)
            .ok_or_else(|| HmsError::not_found(format!("{} in inventory", name)))
    }

    /// Returns the remaining stock.
    pub fn deduct(&mut self, name: &str, quantity: u32) -> HmsResult<u32> {
        self.get_mut(name)?.deduct_stock(quantity)
    }

    /// Returns the new stock.
    pub fn replenish(&mut self, name: &str, amount: u32) -> HmsResult<u32> {
        Ok(self.get_mut(name)?.replenish(amount))
    }

    pub fn remove(&mut self, name: &str) -> HmsResult<Medicine> {
        let index = self
            .medicines
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| HmsError::not_found(format!("{} in inventory", name)))?;
        let removed = self.medicines.remove(index);
        info!(medicine = %removed.name, "medicine removed from inventory");
        Ok(removed)
    }

    pub fn update_stock(&mut self, name: &str, new_stock: u32) -> HmsResult<()> {
        let medicine = self.get_mut(name)?;
        medicine.stock = new_stock;
        info!(medicine = %medicine.name, stock = new_stock, "stock updated");
        Ok(())
    }

    pub fn update_alert_level(&mut self, name: &str, new_level: u32) -> HmsResult<()> {
        let medicine = self.get_mut(name)?;
        medicine.alert_level = new_level;
        info!(medicine = %medicine.name, alert_level = new_level, "alert level updated");
        Ok(())
    }

    pub fn low_stock(&self) -> Vec<&Medicine> {
        self.medicines.iter().filter(|m| m.needs_replenishment()).collect()
    }
}
