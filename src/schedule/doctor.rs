use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HmsError, HmsResult};
use super::types::TimeSlot;

/// A doctor's profile, open slots, booked appointment ids and the patients
/// they have accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub user_id: String,
    pub name: String,
    pub gender: String,
    pub age: u32,
    availability: Vec<TimeSlot>,
    appointments: Vec<String>,
    assigned_patients: Vec<String>,
}

impl Doctor {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, gender: impl Into<String>, age: u32) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            gender: gender.into(),
            age,
            availability: Vec::new(),
            appointments: Vec::new(),
            assigned_patients: Vec::new(),
        }
    }

    pub fn availability(&self) -> &[TimeSlot] {
        &self.availability
    }

    /// Fails with `Conflict` when an equal slot is already open.
    pub fn add_availability(&mut self, slot: TimeSlot) -> HmsResult<()> {
        if self.availability.contains(&slot) {
            return Err(HmsError::conflict(format!(
                "Dr. {} already has {} open",
                self.name, slot
            )));
        }
        self.availability.push(slot);
        Ok(())
    }

    /// Adds every slot not already open and returns how many were added.
    pub fn add_availability_range<I>(&mut self, slots: I) -> usize
    where
        I: IntoIterator<Item = TimeSlot>,
    {
        let mut added = 0;
        for slot in slots {
            if self.add_availability(slot).is_ok() {
                added += 1;
            } else {
                debug!(doctor = %self.user_id, %slot, "skipping slot already open");
            }
        }
        added
    }

    pub fn remove_availability(&mut self, slot: &TimeSlot) -> HmsResult<()> {
        match self.availability.iter().position(|s| s == slot) {
            Some(index) => {
                self.availability.remove(index);
                Ok(())
            }
            None => Err(HmsError::not_found(format!(
                "slot {} in Dr. {}'s availability",
                slot, self.name
            ))),
        }
    }

    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        self.availability.contains(slot)
    }

    pub fn appointment_ids(&self) -> &[String] {
        &self.appointments
    }

    pub fn has_appointment(&self, appointment_id: &str) -> bool {
        self.appointments.iter().any(|id| id == appointment_id)
    }

    /// Returns false if the id was already listed.
    pub fn add_appointment(&mut self, appointment_id: &str) -> bool {
        if self.has_appointment(appointment_id) {
            return false;
        }
        self.appointments.push(appointment_id.to_string());
        true
    }

    pub fn remove_appointment(&mut self, appointment_id: &str) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|id| id != appointment_id);
        self.appointments.len() != before
    }

    pub fn assigned_patients(&self) -> &[String] {
        &self.assigned_patients
    }

    pub fn is_assigned(&self, patient_id: &str) -> bool {
        self.assigned_patients.iter().any(|id| id == patient_id)
    }

    /// Idempotent: returns true only when the patient was newly assigned.
    pub fn assign_patient(&mut self, patient_id: &str) -> bool {
        if self.is_assigned(patient_id) {
            return false;
        }
        self.assigned_patients.push(patient_id.to_string());
        true
    }
}

/// Resolves doctor ids to live doctors.
pub trait DoctorDirectory {
    fn doctors(&self) -> &[Doctor];
    fn doctors_mut(&mut self) -> &mut [Doctor];

    fn find_doctor(&self, doctor_id: &str) -> Option<&Doctor> {
        self.doctors().iter().find(|d| d.user_id.eq_ignore_ascii_case(doctor_id))
    }

    fn find_doctor_mut(&mut self, doctor_id: &str) -> Option<&mut Doctor> {
        self.doctors_mut().iter_mut().find(|d| d.user_id.eq_ignore_ascii_case(doctor_id))
    }
}

impl DoctorDirectory for Vec<Doctor> {
    fn doctors(&self) -> &[Doctor] {
        self
    }

    fn doctors_mut(&mut self) -> &mut [Doctor] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn slot(hour: u32) -> TimeSlot {
        TimeSlot::new(
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn duplicate_availability_is_rejected_and_set_unchanged() {
        let mut doctor = Doctor::new("D1", "Grey", "Female", 40);
        doctor.add_availability(slot(9)).unwrap();
        let err = doctor.add_availability(slot(9)).unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)));
        assert_eq!(doctor.availability(), &[slot(9)]);
    }

    #[test]
    fn removing_missing_slot_is_not_found() {
        let mut doctor = Doctor::new("D1", "Grey", "Female", 40);
        assert!(matches!(doctor.remove_availability(&slot(9)), Err(HmsError::NotFound(_))));
        doctor.add_availability(slot(9)).unwrap();
        doctor.remove_availability(&slot(9)).unwrap();
        assert!(!doctor.is_available(&slot(9)));
    }

    #[test]
    fn range_skips_open_slots() {
        let mut doctor = Doctor::new("D1", "Grey", "Female", 40);
        doctor.add_availability(slot(10)).unwrap();
        let added = doctor.add_availability_range(vec![slot(9), slot(10), slot(11)]);
        assert_eq!(added, 2);
        assert_eq!(doctor.availability().len(), 3);
    }

    #[test]
    fn assign_patient_is_idempotent() {
        let mut doctor = Doctor::new("D1", "Grey", "Female", 40);
        assert!(doctor.assign_patient("P1"));
        assert!(!doctor.assign_patient("P1"));
        assert_eq!(doctor.assigned_patients(), &["P1".to_string()]);
    }

    #[test]
    fn directory_lookup_ignores_case() {
        let doctors = vec![Doctor::new("D1", "Grey", "Female", 40)];
        assert!(doctors.find_doctor("d1").is_some());
        assert!(doctors.find_doctor("D2").is_none());
    }
}
