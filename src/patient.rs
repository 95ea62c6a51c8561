use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HmsError, HmsResult};
use crate::schedule::AppointmentOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Everything recorded about one patient. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    patient_id: String,
    diagnoses: Vec<Diagnosis>,
    treatments: Vec<Treatment>,
    prescriptions: Vec<String>,
    outcomes: Vec<AppointmentOutcome>,
}

impl MedicalRecord {
    fn new(patient_id: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            diagnoses: Vec::new(),
            treatments: Vec::new(),
            prescriptions: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn diagnoses(&self) -> &[Diagnosis] {
        &self.diagnoses
    }

    pub fn treatments(&self) -> &[Treatment] {
        &self.treatments
    }

    /// Prescription ids, resolved through the prescription ledger.
    pub fn prescriptions(&self) -> &[String] {
        &self.prescriptions
    }

    pub fn outcomes(&self) -> &[AppointmentOutcome] {
        &self.outcomes
    }

    pub fn add_diagnosis(&mut self, diagnosis: Diagnosis) {
        self.diagnoses.push(diagnosis);
    }

    pub fn add_treatment(&mut self, treatment: Treatment) {
        self.treatments.push(treatment);
    }

    pub fn add_prescription(&mut self, prescription_id: &str) {
        self.prescriptions.push(prescription_id.to_string());
    }

    pub fn add_outcome(&mut self, outcome: AppointmentOutcome) {
        self.outcomes.push(outcome);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub user_id: String,
    pub name: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: String,
    email: String,
    phone: Option<String>,
    appointments: Vec<String>,
    record: MedicalRecord,
}

impl Patient {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, gender: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let record = MedicalRecord::new(&user_id);
        Self {
            user_id,
            name: name.into(),
            gender: gender.into(),
            date_of_birth: None,
            blood_type: String::new(),
            email: String::new(),
            phone: None,
            appointments: Vec::new(),
            record,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Replaces contact details after checking their shape.
    pub fn update_contact(&mut self, email: &str, phone: Option<&str>) -> HmsResult<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(HmsError::validation(format!("'{}' is not a valid email address", email)));
        }
        let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p.chars().all(|c| c.is_ascii_digit()) => Some(p.to_string()),
            Some(p) => return Err(HmsError::validation(format!("phone number '{}' must contain only digits", p))),
            None => None,
        };
        self.email = email.to_string();
        self.phone = phone;
        Ok(())
    }

    /// Ids of this patient's appointments. Resolve them through the
    /// appointment registry; this list is the patient's own copy.
    pub fn appointment_ids(&self) -> &[String] {
        &self.appointments
    }

    pub fn has_appointment(&self, appointment_id: &str) -> bool {
        self.appointments.iter().any(|id| id == appointment_id)
    }

    pub(crate) fn add_appointment(&mut self, appointment_id: &str) {
        if !self.has_appointment(appointment_id) {
            self.appointments.push(appointment_id.to_string());
        }
    }

    pub(crate) fn remove_appointment(&mut self, appointment_id: &str) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|id| id != appointment_id);
        self.appointments.len() != before
    }

    pub fn medical_record(&self) -> &MedicalRecord {
        &self.record
    }

    pub fn medical_record_mut(&mut self) -> &mut MedicalRecord {
        &mut self.record
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split_once('.').map(|(host, tld)| !host.is_empty() && !tld.is_empty()).unwrap_or(false)
        }
        None => false,
    }
}

/// Resolves patient ids to live patients.
pub trait PatientDirectory {
    fn patients(&self) -> &[Patient];
    fn patients_mut(&mut self) -> &mut [Patient];

    fn find_patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients().iter().find(|p| p.user_id == patient_id)
    }

    fn find_patient_mut(&mut self, patient_id: &str) -> Option<&mut Patient> {
        self.patients_mut().iter_mut().find(|p| p.user_id == patient_id)
    }
}

impl PatientDirectory for Vec<Patient> {
    fn patients(&self) -> &[Patient] {
        self
    }

    fn patients_mut(&mut self) -> &mut [Patient] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_created_with_the_patient() {
        let patient = Patient::new("P1", "Alice", "Female");
        assert_eq!(patient.medical_record().patient_id(), "P1");
        assert!(patient.medical_record().outcomes().is_empty());
    }

    #[test]
    fn contact_update_validates_email_and_phone() {
        let mut patient = Patient::new("P1", "Alice", "Female");
        patient.update_contact("alice@example.com", Some("91234567")).unwrap();
        assert_eq!(patient.email(), "alice@example.com");
        assert_eq!(patient.phone(), Some("91234567"));

        assert!(patient.update_contact("alice.example.com", None).is_err());
        assert!(patient.update_contact("alice@example", None).is_err());
        assert!(patient.update_contact("alice@example.com", Some("9123-4567")).is_err());
        assert_eq!(patient.email(), "alice@example.com");
    }

    #[test]
    fn appointment_ids_are_not_duplicated() {
        let mut patient = Patient::new("P1", "Alice", "Female");
        patient.add_appointment("APT1");
        patient.add_appointment("APT1");
        assert_eq!(patient.appointment_ids().len(), 1);
        assert!(patient.remove_appointment("APT1"));
        assert!(!patient.remove_appointment("APT1"));
    }
}
