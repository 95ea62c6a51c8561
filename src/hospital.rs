use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::{HmsError, HmsResult};
use crate::ids::generate_id;
use crate::patient::{Diagnosis, MedicalRecord, Patient, PatientDirectory, Treatment};
use crate::pharmacy::{
    DispenseReport, MedicineInventory, Prescription, PrescriptionItem, PrescriptionLedger, ReplenishmentRegistry,
};
use crate::roles::{Caller, Capability, Role, StaffMember};
use crate::schedule::{
    AppointmentEngine, AppointmentOutcome, AppointmentStatus, Doctor, DoctorDirectory, TimeSlot,
};

/// Root context owning every collection for the lifetime of the process.
///
/// Entities point at each other by id only; this type resolves ids and
/// runs the workflows that span several collections.
#[derive(Debug, Default)]
pub struct Hospital {
    staff: Vec<StaffMember>,
    doctors: Vec<Doctor>,
    patients: Vec<Patient>,
    inventory: MedicineInventory,
    prescriptions: PrescriptionLedger,
    replenishments: ReplenishmentRegistry,
    appointments: AppointmentEngine,
}

impl Hospital {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(inventory: MedicineInventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    // ---- lookups ----

    pub fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn inventory(&self) -> &MedicineInventory {
        &self.inventory
    }

    pub fn prescriptions(&self) -> &PrescriptionLedger {
        &self.prescriptions
    }

    pub fn replenishments(&self) -> &ReplenishmentRegistry {
        &self.replenishments
    }

    pub fn appointments(&self) -> &AppointmentEngine {
        &self.appointments
    }

    pub fn doctor(&self, doctor_id: &str) -> HmsResult<&Doctor> {
        self.doctors
            .find_doctor(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))
    }

    pub fn patient(&self, patient_id: &str) -> HmsResult<&Patient> {
        self.patients
            .find_patient(patient_id)
            .ok_or_else(|| HmsError::not_found(format!("patient {}", patient_id)))
    }

    pub fn find_staff(&self, user_id: &str) -> Option<&StaffMember> {
        self.staff.iter().find(|s| s.user_id.eq_ignore_ascii_case(user_id))
    }

    pub fn staff_by_role(&self, role: Role) -> Vec<&StaffMember> {
        self.staff.iter().filter(|s| s.role == role).collect()
    }

    fn id_in_use(&self, user_id: &str) -> bool {
        self.find_staff(user_id).is_some() || self.patients.iter().any(|p| p.user_id.eq_ignore_ascii_case(user_id))
    }

    // ---- roster ----

    /// Adds a staff member to the roster. Doctors also get a schedule.
    pub fn add_staff(&mut self, member: StaffMember) -> HmsResult<()> {
        if member.role == Role::Patient {
            return Err(HmsError::validation(format!("{} is a patient, not staff", member.user_id)));
        }
        if self.id_in_use(&member.user_id) {
            return Err(HmsError::conflict(format!("user id {} is already in use", member.user_id)));
        }
        if member.role == Role::Doctor {
            self.doctors
                .push(Doctor::new(member.user_id.clone(), member.name.clone(), member.gender.clone(), member.age));
        }
        info!(user = %member.user_id, role = %member.role, "staff member added");
        self.staff.push(member);
        Ok(())
    }

    pub fn hire_staff(&mut self, caller: Caller<'_>, member: StaffMember) -> HmsResult<()> {
        caller.require(Capability::ManageStaff)?;
        self.add_staff(member)
    }

    /// Removes a staff member. A doctor's schedule goes with them; their
    /// appointments stay in the registry.
    pub fn remove_staff(&mut self, caller: Caller<'_>, user_id: &str) -> HmsResult<StaffMember> {
        caller.require(Capability::ManageStaff)?;
        let index = self
            .staff
            .iter()
            .position(|s| s.user_id.eq_ignore_ascii_case(user_id))
            .ok_or_else(|| HmsError::not_found(format!("staff member {}", user_id)))?;
        let live = self
            .appointments
            .appointments()
            .iter()
            .filter(|a| a.doctor_id().eq_ignore_ascii_case(user_id) && a.status().holds_slot())
            .count();
        if live > 0 {
            warn!(user = %user_id, live, "staff removal refused while appointments are open");
            return Err(HmsError::conflict(format!(
                "Dr. {} still has {} pending or confirmed appointment(s)",
                self.staff[index].name, live
            )));
        }
        let removed = self.staff.remove(index);
        self.doctors.retain(|d| !d.user_id.eq_ignore_ascii_case(&removed.user_id));
        info!(user = %removed.user_id, by = %caller.user_id(), "staff member removed");
        Ok(removed)
    }

    pub fn add_patient(&mut self, patient: Patient) -> HmsResult<()> {
        if self.id_in_use(&patient.user_id) {
            return Err(HmsError::conflict(format!("user id {} is already in use", patient.user_id)));
        }
        info!(patient = %patient.user_id, "patient registered");
        self.patients.push(patient);
        Ok(())
    }

    pub fn update_patient_contact(&mut self, patient_id: &str, email: &str, phone: Option<&str>) -> HmsResult<()> {
        self.patients
            .find_patient_mut(patient_id)
            .ok_or_else(|| HmsError::not_found(format!("patient {}", patient_id)))?
            .update_contact(email, phone)
    }

    // ---- availability ----

    fn doctor_mut(&mut self, doctor_id: &str) -> HmsResult<&mut Doctor> {
        self.doctors
            .find_doctor_mut(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))
    }

    pub fn add_availability(&mut self, doctor_id: &str, slot: TimeSlot) -> HmsResult<()> {
        self.doctor_mut(doctor_id)?.add_availability(slot)
    }

    pub fn add_availability_range<I>(&mut self, doctor_id: &str, slots: I) -> HmsResult<usize>
    where
        I: IntoIterator<Item = TimeSlot>,
    {
        let doctor = self.doctor_mut(doctor_id)?;
        let added = doctor.add_availability_range(slots);
        info!(doctor = %doctor.user_id, added, "availability added");
        Ok(added)
    }

    pub fn remove_availability(&mut self, doctor_id: &str, slot: &TimeSlot) -> HmsResult<()> {
        self.doctor_mut(doctor_id)?.remove_availability(slot)
    }

    pub fn available_slots(&self, doctor_id: &str) -> HmsResult<Vec<TimeSlot>> {
        let mut slots = self.doctor(doctor_id)?.availability().to_vec();
        slots.sort();
        Ok(slots)
    }

    // ---- appointment lifecycle ----

    pub fn schedule_appointment(&mut self, patient_id: &str, doctor_id: &str, slot: TimeSlot) -> HmsResult<String> {
        self.appointments
            .schedule_appointment(&mut self.doctors, &mut self.patients, patient_id, doctor_id, slot)
    }

    pub fn reschedule_appointment(
        &mut self,
        patient_id: &str,
        appointment_id: &str,
        new_slot: TimeSlot,
        doctor_id: &str,
    ) -> HmsResult<()> {
        self.appointments
            .reschedule_appointment(&mut self.doctors, patient_id, appointment_id, new_slot, doctor_id)
    }

    pub fn accept_appointment(&mut self, doctor_id: &str, appointment_id: &str) -> HmsResult<()> {
        self.appointments
            .accept_appointment(&mut self.doctors, &mut self.patients, doctor_id, appointment_id)
    }

    pub fn decline_appointment(&mut self, doctor_id: &str, appointment_id: &str) -> HmsResult<()> {
        self.appointments.decline_appointment(&mut self.doctors, doctor_id, appointment_id)
    }

    pub fn cancel_appointment(&mut self, appointment_id: &str, caller: Caller<'_>) -> HmsResult<()> {
        self.appointments
            .cancel_appointment(&mut self.doctors, &mut self.patients, appointment_id, caller)
    }

    pub fn record_appointment_outcome(
        &mut self,
        doctor_id: &str,
        patient_id: &str,
        appointment_id: &str,
        services: &str,
        notes: &str,
        prescription_id: Option<String>,
    ) -> HmsResult<()> {
        if let Some(id) = prescription_id.as_deref() {
            if !self.prescriptions.contains(id) {
                return Err(HmsError::not_found(format!("prescription {}", id)));
            }
        }
        self.appointments.record_appointment_outcome(
            &mut self.patients,
            doctor_id,
            patient_id,
            appointment_id,
            services,
            notes,
            prescription_id,
        )
    }

    /// Closes a Confirmed appointment: optionally prescribes, records the
    /// outcome, then marks it Completed. Returns the prescription id, if any.
    ///
    /// Everything is checked up front, so a rejected call changes nothing.
    pub fn complete_appointment(
        &mut self,
        doctor_id: &str,
        appointment_id: &str,
        services: &str,
        notes: &str,
        items: Option<Vec<PrescriptionItem>>,
    ) -> HmsResult<Option<String>> {
        let appointment = self.appointments.find_by_id(appointment_id)?;
        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) {
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not with doctor {}",
                appointment_id, doctor_id
            )));
        }
        if appointment.status() != AppointmentStatus::Confirmed {
            return Err(HmsError::conflict(format!(
                "appointment {} is {}, only Confirmed appointments can be completed",
                appointment_id,
                appointment.status()
            )));
        }
        if appointment.outcome().is_some() {
            return Err(HmsError::conflict(format!("appointment {} already has an outcome", appointment_id)));
        }
        let patient_id = appointment.patient_id().to_string();
        self.patient(&patient_id)?;

        let prescription = match items {
            Some(items) => Some(self.build_prescription(items)?),
            None => None,
        };
        let prescription_id = prescription.as_ref().map(|p| p.id().to_string());
        if let Some(prescription) = prescription {
            self.file_prescription(&patient_id, prescription)?;
        }

        self.appointments.record_appointment_outcome(
            &mut self.patients,
            doctor_id,
            &patient_id,
            appointment_id,
            services,
            notes,
            prescription_id.clone(),
        )?;
        self.appointments.mark_completed(doctor_id, appointment_id)?;
        Ok(prescription_id)
    }

    pub fn outcomes_for_patient(&self, patient_id: &str) -> HmsResult<Vec<&AppointmentOutcome>> {
        self.patient(patient_id)?;
        Ok(self.appointments.outcomes_for_patient(patient_id))
    }

    pub fn all_outcomes(&self, caller: Caller<'_>) -> HmsResult<Vec<&AppointmentOutcome>> {
        self.appointments.all_outcomes(caller)
    }

    // ---- medical records ----

    /// Doctors may only touch records of patients assigned to them.
    fn check_assigned(&self, doctor_id: &str, patient_id: &str) -> HmsResult<()> {
        let doctor = self.doctor(doctor_id)?;
        self.patient(patient_id)?;
        if !doctor.is_assigned(patient_id) {
            warn!(doctor = %doctor_id, patient = %patient_id, "record access refused for unassigned patient");
            return Err(HmsError::unauthorized(format!(
                "patient {} is not assigned to Dr. {}",
                patient_id, doctor.name
            )));
        }
        Ok(())
    }

    fn record_mut(&mut self, patient_id: &str) -> HmsResult<&mut MedicalRecord> {
        self.patients
            .find_patient_mut(patient_id)
            .map(Patient::medical_record_mut)
            .ok_or_else(|| HmsError::not_found(format!("patient {}", patient_id)))
    }

    pub fn view_medical_record(&self, doctor_id: &str, patient_id: &str) -> HmsResult<&MedicalRecord> {
        self.check_assigned(doctor_id, patient_id)?;
        Ok(self.patient(patient_id)?.medical_record())
    }

    pub fn add_diagnosis(&mut self, doctor_id: &str, patient_id: &str, description: &str) -> HmsResult<String> {
        self.check_assigned(doctor_id, patient_id)?;
        let description = non_empty(description, "diagnosis")?;
        let record = self.record_mut(patient_id)?;
        let id = generate_id("DG", |c| record.diagnoses().iter().any(|d| d.id == c));
        record.add_diagnosis(Diagnosis {
            id: id.clone(),
            description,
            date: today(),
        });
        info!(patient = %patient_id, doctor = %doctor_id, diagnosis = %id, "diagnosis added");
        Ok(id)
    }

    pub fn add_treatment(&mut self, doctor_id: &str, patient_id: &str, description: &str) -> HmsResult<String> {
        self.check_assigned(doctor_id, patient_id)?;
        let description = non_empty(description, "treatment")?;
        let record = self.record_mut(patient_id)?;
        let id = generate_id("TR", |c| record.treatments().iter().any(|t| t.id == c));
        record.add_treatment(Treatment {
            id: id.clone(),
            description,
            date: today(),
        });
        info!(patient = %patient_id, doctor = %doctor_id, treatment = %id, "treatment added");
        Ok(id)
    }

    pub fn issue_prescription(
        &mut self,
        doctor_id: &str,
        patient_id: &str,
        items: Vec<PrescriptionItem>,
    ) -> HmsResult<String> {
        self.check_assigned(doctor_id, patient_id)?;
        let prescription = self.build_prescription(items)?;
        let id = prescription.id().to_string();
        self.file_prescription(patient_id, prescription)?;
        Ok(id)
    }

    /// Validates items against the inventory and normalises medicine names
    /// to the inventory's spelling.
    fn build_prescription(&self, items: Vec<PrescriptionItem>) -> HmsResult<Prescription> {
        let items = items
            .into_iter()
            .map(|item| match self.inventory.find(&item.medicine) {
                Some(medicine) => Ok(PrescriptionItem::new(medicine.name(), item.quantity)),
                None => Err(HmsError::not_found(format!("{} in inventory", item.medicine))),
            })
            .collect::<HmsResult<Vec<_>>>()?;
        let id = generate_id("RX", |c| self.prescriptions.contains(c));
        Prescription::new(id, items)
    }

    fn file_prescription(&mut self, patient_id: &str, prescription: Prescription) -> HmsResult<()> {
        let id = prescription.id().to_string();
        self.record_mut(patient_id)?;
        self.prescriptions.add(prescription)?;
        self.record_mut(patient_id)?.add_prescription(&id);
        Ok(())
    }

    // ---- pharmacy ----

    pub fn manage_inventory(&mut self, caller: Caller<'_>) -> HmsResult<&mut MedicineInventory> {
        caller.require(Capability::ManageInventory)?;
        Ok(&mut self.inventory)
    }

    pub fn submit_replenishment_request(&mut self, caller: Caller<'_>, medicine: &str, amount: u32) -> HmsResult<String> {
        caller.require(Capability::RequestReplenishment)?;
        if amount == 0 {
            return Err(HmsError::validation("replenishment amount must be greater than zero"));
        }
        let found = self
            .inventory
            .find(medicine)
            .ok_or_else(|| HmsError::not_found(format!("{} in inventory", medicine)))?;
        if !found.needs_replenishment() {
            return Err(HmsError::conflict(format!(
                "{} has {} in stock, above its alert level of {}",
                found.name(),
                found.stock(),
                found.alert_level()
            )));
        }
        if self.replenishments.has_pending_for(found.name()) {
            return Err(HmsError::conflict(format!("{} already has a pending request", found.name())));
        }

        let requester_name = self
            .find_staff(caller.user_id())
            .map(|s| s.name.clone())
            .unwrap_or_else(|| caller.user_id().to_string());
        Ok(self
            .replenishments
            .create(found, amount, caller.user_id(), &requester_name))
    }

    pub fn approve_replenishment(&mut self, caller: Caller<'_>, request_id: &str) -> HmsResult<u32> {
        caller.require(Capability::ApproveReplenishment)?;
        self.replenishments.approve(request_id, &mut self.inventory)
    }

    pub fn dispense_prescription(&mut self, caller: Caller<'_>, prescription_id: &str) -> HmsResult<DispenseReport> {
        caller.require(Capability::DispenseMedicine)?;
        self.prescriptions.dispense(prescription_id, &mut self.inventory)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn non_empty(value: &str, what: &str) -> HmsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HmsError::validation(format!("{} description is required", what)));
    }
    Ok(trimmed.to_string())
}
