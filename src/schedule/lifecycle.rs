use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::doctor::{Doctor, DoctorDirectory};
use super::types::{Appointment, AppointmentOutcome, AppointmentStatus, TimeSlot};
use crate::error::{HmsError, HmsResult};
use crate::ids::generate_id;
use crate::patient::{Patient, PatientDirectory};
use crate::roles::{Caller, Capability};

/// Anything that keeps its own list of appointment ids.
pub trait Schedulable {
    fn appointment_ids(&self) -> &[String];
}

impl Schedulable for Doctor {
    fn appointment_ids(&self) -> &[String] {
        Doctor::appointment_ids(self)
    }
}

impl Schedulable for Patient {
    fn appointment_ids(&self) -> &[String] {
        Patient::appointment_ids(self)
    }
}

/// Owns every appointment ever created and drives their status changes.
///
/// Doctors and patients are passed in per call and only referenced by id,
/// so the engine never holds onto either side. Each operation validates
/// everything it needs before touching any state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentEngine {
    appointments: Vec<Appointment>,
}

impl AppointmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn find_by_id(&self, appointment_id: &str) -> HmsResult<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.id() == appointment_id)
            .ok_or_else(|| HmsError::not_found(format!("appointment {}", appointment_id)))
    }

    fn index_of(&self, appointment_id: &str) -> HmsResult<usize> {
        self.appointments
            .iter()
            .position(|a| a.id() == appointment_id)
            .ok_or_else(|| HmsError::not_found(format!("appointment {}", appointment_id)))
    }

    fn is_taken(&self, candidate: &str) -> bool {
        self.appointments.iter().any(|a| a.id() == candidate)
    }

    /// Books `slot` with a doctor and returns the new appointment id.
    pub fn schedule_appointment<D, P>(
        &mut self,
        doctors: &mut D,
        patients: &mut P,
        patient_id: &str,
        doctor_id: &str,
        slot: TimeSlot,
    ) -> HmsResult<String>
    where
        D: DoctorDirectory,
        P: PatientDirectory,
    {
        let patient = patients
            .find_patient_mut(patient_id)
            .ok_or_else(|| HmsError::not_found(format!("patient {}", patient_id)))?;
        let doctor = doctors
            .find_doctor_mut(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))?;

        if !doctor.is_available(&slot) {
            warn!(doctor = %doctor.user_id, %slot, "requested slot is not available");
            return Err(HmsError::conflict(format!(
                "Dr. {} is not available at {}",
                doctor.name, slot
            )));
        }

        let id = generate_id("APT", |candidate| self.is_taken(candidate));
        doctor.remove_availability(&slot)?;
        doctor.add_appointment(&id);
        patient.add_appointment(&id);
        self.appointments.push(Appointment::new(
            id.clone(),
            patient.user_id.clone(),
            doctor.user_id.clone(),
            slot,
        ));

        info!(appointment = %id, patient = %patient.user_id, doctor = %doctor.user_id, %slot, "appointment scheduled");
        Ok(id)
    }

    /// Moves a Pending or Confirmed appointment to another open slot of the
    /// same doctor. Status is left alone.
    pub fn reschedule_appointment<D>(
        &mut self,
        doctors: &mut D,
        patient_id: &str,
        appointment_id: &str,
        new_slot: TimeSlot,
        doctor_id: &str,
    ) -> HmsResult<()>
    where
        D: DoctorDirectory,
    {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];

        if appointment.patient_id() != patient_id {
            return Err(HmsError::unauthorized(format!(
                "appointment {} does not belong to patient {}",
                appointment_id, patient_id
            )));
        }
        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) {
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not with doctor {}",
                appointment_id, doctor_id
            )));
        }
        if !appointment.status().holds_slot() {
            return Err(HmsError::conflict(format!(
                "appointment {} is {} and cannot be rescheduled",
                appointment_id,
                appointment.status()
            )));
        }

        let doctor = doctors
            .find_doctor_mut(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))?;
        if !doctor.is_available(&new_slot) {
            warn!(appointment = %appointment_id, slot = %new_slot, "reschedule target is not available");
            return Err(HmsError::conflict(format!(
                "Dr. {} is not available at {}",
                doctor.name, new_slot
            )));
        }

        let old_slot = appointment.slot();
        doctor.remove_availability(&new_slot)?;
        appointment.set_slot(new_slot);
        if doctor.add_availability(old_slot).is_err() {
            warn!(doctor = %doctor.user_id, slot = %old_slot, "old slot was already open");
        }

        info!(appointment = %appointment_id, from = %old_slot, to = %new_slot, "appointment rescheduled");
        Ok(())
    }

    /// Confirms a Pending appointment and assigns its patient to the doctor.
    /// Accepting an already Confirmed appointment succeeds without change.
    pub fn accept_appointment<D, P>(
        &mut self,
        doctors: &mut D,
        patients: &mut P,
        doctor_id: &str,
        appointment_id: &str,
    ) -> HmsResult<()>
    where
        D: DoctorDirectory,
        P: PatientDirectory,
    {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];

        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) {
            warn!(appointment = %appointment_id, doctor = %doctor_id, "accept refused for doctor not of record");
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not with doctor {}",
                appointment_id, doctor_id
            )));
        }
        let doctor = doctors
            .find_doctor_mut(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))?;
        let patient = patients
            .find_patient_mut(appointment.patient_id())
            .ok_or_else(|| HmsError::not_found(format!("patient {}", appointment.patient_id())))?;

        match appointment.status() {
            AppointmentStatus::Confirmed => {
                info!(appointment = %appointment_id, "appointment already confirmed");
                return Ok(());
            }
            AppointmentStatus::Pending => appointment.transition(AppointmentStatus::Confirmed)?,
            other => {
                return Err(HmsError::conflict(format!(
                    "appointment {} is {} and cannot be accepted",
                    appointment_id, other
                )))
            }
        }

        if !doctor.has_appointment(appointment_id) {
            if doctor.remove_availability(&appointment.slot()).is_err() {
                debug!(doctor = %doctor.user_id, slot = %appointment.slot(), "accepted slot was already closed");
            }
            doctor.add_appointment(appointment_id);
            warn!(appointment = %appointment_id, doctor = %doctor.user_id, "appointment was missing from doctor's list; added");
        }
        if !patient.has_appointment(appointment_id) {
            patient.add_appointment(appointment_id);
            warn!(appointment = %appointment_id, patient = %patient.user_id, "appointment was missing from patient's list; added");
        }
        doctor.assign_patient(&patient.user_id);

        info!(appointment = %appointment_id, doctor = %doctor.user_id, patient = %patient.user_id, "appointment accepted");
        Ok(())
    }

    /// Declines a Pending appointment and reopens its slot.
    pub fn decline_appointment<D>(
        &mut self,
        doctors: &mut D,
        doctor_id: &str,
        appointment_id: &str,
    ) -> HmsResult<()>
    where
        D: DoctorDirectory,
    {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];
        let doctor = doctors
            .find_doctor_mut(doctor_id)
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", doctor_id)))?;

        let on_list = doctor.has_appointment(appointment_id);
        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) || !on_list {
            warn!(appointment = %appointment_id, doctor = %doctor_id, "decline refused");
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not on Dr. {}'s list",
                appointment_id, doctor.name
            )));
        }
        if appointment.status() != AppointmentStatus::Pending {
            return Err(HmsError::conflict(format!(
                "appointment {} is {} and cannot be declined",
                appointment_id,
                appointment.status()
            )));
        }

        appointment.transition(AppointmentStatus::Declined)?;
        if doctor.add_availability(appointment.slot()).is_err() {
            warn!(doctor = %doctor.user_id, slot = %appointment.slot(), "declined slot was already open");
        }

        info!(appointment = %appointment_id, doctor = %doctor.user_id, "appointment declined");
        Ok(())
    }

    /// Cancels on behalf of the appointment's doctor or patient. The
    /// appointment stays in the registry as Cancelled; both parties drop it
    /// from their lists and the slot reopens.
    pub fn cancel_appointment<D, P>(
        &mut self,
        doctors: &mut D,
        patients: &mut P,
        appointment_id: &str,
        caller: Caller<'_>,
    ) -> HmsResult<()>
    where
        D: DoctorDirectory,
        P: PatientDirectory,
    {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];

        let is_party = match caller {
            Caller::Doctor(id) => appointment.doctor_id().eq_ignore_ascii_case(id),
            Caller::Patient(id) => appointment.patient_id() == id,
            _ => false,
        };
        if !is_party {
            warn!(appointment = %appointment_id, caller = %caller.user_id(), "cancel refused for caller not of record");
            return Err(HmsError::unauthorized(format!(
                "{} {} is not a party to appointment {}",
                caller.role(),
                caller.user_id(),
                appointment_id
            )));
        }

        let doctor = doctors
            .find_doctor_mut(appointment.doctor_id())
            .ok_or_else(|| HmsError::not_found(format!("doctor {}", appointment.doctor_id())))?;
        let patient = patients
            .find_patient_mut(appointment.patient_id())
            .ok_or_else(|| HmsError::not_found(format!("patient {}", appointment.patient_id())))?;

        if !appointment.status().holds_slot() {
            return Err(HmsError::conflict(format!(
                "appointment {} is {} and cannot be cancelled",
                appointment_id,
                appointment.status()
            )));
        }

        appointment.transition(AppointmentStatus::Cancelled)?;
        patient.remove_appointment(appointment_id);
        doctor.remove_appointment(appointment_id);
        if doctor.add_availability(appointment.slot()).is_err() {
            warn!(doctor = %doctor.user_id, slot = %appointment.slot(), "cancelled slot was already open");
        }

        info!(appointment = %appointment_id, by = %caller.user_id(), "appointment cancelled");
        Ok(())
    }

    /// Attaches the single outcome of an appointment and files a copy in the
    /// patient's medical record. Status is not changed here.
    #[allow(clippy::too_many_arguments)]
    pub fn record_appointment_outcome<P>(
        &mut self,
        patients: &mut P,
        doctor_id: &str,
        patient_id: &str,
        appointment_id: &str,
        services: &str,
        notes: &str,
        prescription_id: Option<String>,
    ) -> HmsResult<()>
    where
        P: PatientDirectory,
    {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];

        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) {
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not with doctor {}",
                appointment_id, doctor_id
            )));
        }
        let patient = patients
            .find_patient_mut(patient_id)
            .ok_or_else(|| HmsError::not_found(format!("patient {}", patient_id)))?;
        if appointment.patient_id() != patient_id {
            return Err(HmsError::validation(format!(
                "appointment {} does not belong to patient {}",
                appointment_id, patient_id
            )));
        }

        let outcome = AppointmentOutcome {
            appointment_id: appointment_id.to_string(),
            services: services.to_string(),
            notes: notes.to_string(),
            prescription_id,
            date: appointment.slot().date(),
        };
        if let Err(err) = appointment.attach_outcome(outcome.clone()) {
            warn!(appointment = %appointment_id, "outcome already recorded");
            return Err(err);
        }
        patient.medical_record_mut().add_outcome(outcome);

        info!(appointment = %appointment_id, patient = %patient_id, "appointment outcome recorded");
        Ok(())
    }

    /// Confirmed -> Completed, for the doctor of record.
    pub fn mark_completed(&mut self, doctor_id: &str, appointment_id: &str) -> HmsResult<()> {
        let index = self.index_of(appointment_id)?;
        let appointment = &mut self.appointments[index];
        if !appointment.doctor_id().eq_ignore_ascii_case(doctor_id) {
            return Err(HmsError::unauthorized(format!(
                "appointment {} is not with doctor {}",
                appointment_id, doctor_id
            )));
        }
        appointment.transition(AppointmentStatus::Completed)?;
        info!(appointment = %appointment_id, "appointment completed");
        Ok(())
    }

    fn resolve<'a, 'p, S: Schedulable>(
        &'a self,
        party: &'p S,
    ) -> impl Iterator<Item = &'a Appointment> + 'p
    where
        'a: 'p,
    {
        party
            .appointment_ids()
            .iter()
            .filter_map(move |id| self.appointments.iter().find(|a| a.id() == id.as_str()))
    }

    pub fn upcoming_at<S: Schedulable>(&self, party: &S, now: NaiveDateTime) -> Vec<&Appointment> {
        self.resolve(party).filter(|a| a.is_upcoming(now)).collect()
    }

    /// Past by time, or Completed regardless of its date.
    pub fn past_at<S: Schedulable>(&self, party: &S, now: NaiveDateTime) -> Vec<&Appointment> {
        self.resolve(party)
            .filter(|a| a.is_past(now) || a.status() == AppointmentStatus::Completed)
            .collect()
    }

    pub fn upcoming<S: Schedulable>(&self, party: &S) -> Vec<&Appointment> {
        self.upcoming_at(party, Local::now().naive_local())
    }

    pub fn past<S: Schedulable>(&self, party: &S) -> Vec<&Appointment> {
        self.past_at(party, Local::now().naive_local())
    }

    /// Every appointment of a doctor still awaiting a decision.
    pub fn pending_for_doctor(&self, doctor_id: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.doctor_id().eq_ignore_ascii_case(doctor_id) && a.status() == AppointmentStatus::Pending)
            .collect()
    }

    pub fn outcomes_for_patient(&self, patient_id: &str) -> Vec<&AppointmentOutcome> {
        self.appointments
            .iter()
            .filter(|a| a.patient_id() == patient_id)
            .filter_map(Appointment::outcome)
            .collect()
    }

    pub fn all_outcomes(&self, caller: Caller<'_>) -> HmsResult<Vec<&AppointmentOutcome>> {
        caller.require(Capability::ViewAllOutcomes)?;
        Ok(self.appointments.iter().filter_map(Appointment::outcome).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn slot(day: u32, hour: u32) -> TimeSlot {
        TimeSlot::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        )
    }

    struct Fixture {
        engine: AppointmentEngine,
        doctors: Vec<Doctor>,
        patients: Vec<Patient>,
    }

    fn fixture() -> Fixture {
        let mut doctor = Doctor::new("D1", "Grey", "Female", 40);
        doctor.add_availability_range(vec![slot(10, 9), slot(10, 10), slot(11, 9)]);
        Fixture {
            engine: AppointmentEngine::new(),
            doctors: vec![doctor, Doctor::new("D2", "House", "Male", 50)],
            patients: vec![Patient::new("P1", "Alice", "Female"), Patient::new("P2", "Bob", "Male")],
        }
    }

    impl Fixture {
        fn book(&mut self, patient: &str, at: TimeSlot) -> String {
            self.engine
                .schedule_appointment(&mut self.doctors, &mut self.patients, patient, "D1", at)
                .unwrap()
        }

        fn status(&self, id: &str) -> AppointmentStatus {
            self.engine.find_by_id(id).unwrap().status()
        }
    }

    #[test]
    fn scheduling_books_slot_on_both_sides() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));

        assert!(id.starts_with("APT"));
        assert_eq!(f.status(&id), AppointmentStatus::Pending);
        assert!(!f.doctors[0].is_available(&slot(10, 9)));
        assert!(f.doctors[0].has_appointment(&id));
        assert!(f.patients[0].has_appointment(&id));
    }

    #[test]
    fn scheduling_unavailable_slot_changes_nothing() {
        let mut f = fixture();
        let err = f
            .engine
            .schedule_appointment(&mut f.doctors, &mut f.patients, "P1", "D1", slot(12, 9))
            .unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)));
        assert!(f.engine.appointments().is_empty());
        assert!(f.patients[0].appointment_ids().is_empty());
        assert_eq!(f.doctors[0].availability().len(), 3);
    }

    #[test]
    fn scheduling_with_unknown_parties_is_not_found() {
        let mut f = fixture();
        let missing_patient = f
            .engine
            .schedule_appointment(&mut f.doctors, &mut f.patients, "P9", "D1", slot(10, 9));
        let missing_doctor = f
            .engine
            .schedule_appointment(&mut f.doctors, &mut f.patients, "P1", "D9", slot(10, 9));
        assert!(matches!(missing_patient, Err(HmsError::NotFound(_))));
        assert!(matches!(missing_doctor, Err(HmsError::NotFound(_))));
        assert!(f.doctors[0].is_available(&slot(10, 9)));
    }

    #[test]
    fn reschedule_swaps_slots_and_keeps_status() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.engine
            .reschedule_appointment(&mut f.doctors, "P1", &id, slot(11, 9), "D1")
            .unwrap();

        assert_eq!(f.engine.find_by_id(&id).unwrap().slot(), slot(11, 9));
        assert_eq!(f.status(&id), AppointmentStatus::Pending);
        assert!(f.doctors[0].is_available(&slot(10, 9)));
        assert!(!f.doctors[0].is_available(&slot(11, 9)));
    }

    #[test]
    fn reschedule_failures_leave_appointment_alone() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));

        let taken = f.engine.reschedule_appointment(&mut f.doctors, "P1", &id, slot(12, 9), "D1");
        assert!(matches!(taken, Err(HmsError::Conflict(_))));
        let stranger = f.engine.reschedule_appointment(&mut f.doctors, "P2", &id, slot(11, 9), "D1");
        assert!(matches!(stranger, Err(HmsError::Unauthorized(_))));

        assert_eq!(f.engine.find_by_id(&id).unwrap().slot(), slot(10, 9));
        assert!(f.doctors[0].is_available(&slot(11, 9)));
    }

    #[test]
    fn accept_confirms_and_assigns_patient() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D1", &id)
            .unwrap();

        assert_eq!(f.status(&id), AppointmentStatus::Confirmed);
        assert!(f.doctors[0].is_assigned("P1"));
        // accepting twice is harmless
        f.engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D1", &id)
            .unwrap();
        assert_eq!(f.doctors[0].assigned_patients().len(), 1);
    }

    #[test]
    fn accept_by_other_doctor_is_unauthorized() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        let err = f
            .engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D2", &id)
            .unwrap_err();
        assert!(matches!(err, HmsError::Unauthorized(_)));
        assert_eq!(f.status(&id), AppointmentStatus::Pending);
        assert!(f.doctors[1].assigned_patients().is_empty());
    }

    #[test]
    fn accept_relinks_appointment_missing_from_lists() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.doctors[0].remove_appointment(&id);
        f.doctors[0].add_availability(slot(10, 9)).unwrap();
        f.patients[0].remove_appointment(&id);

        f.engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D1", &id)
            .unwrap();

        assert_eq!(f.status(&id), AppointmentStatus::Confirmed);
        assert!(!f.doctors[0].is_available(&slot(10, 9)));
        assert!(f.doctors[0].has_appointment(&id));
        assert!(f.patients[0].has_appointment(&id));
    }

    #[test]
    fn decline_requires_appointment_on_doctors_list() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.doctors[0].remove_appointment(&id);

        let err = f.engine.decline_appointment(&mut f.doctors, "D1", &id).unwrap_err();
        assert!(matches!(err, HmsError::Unauthorized(_)));
        assert_eq!(f.status(&id), AppointmentStatus::Pending);
        assert!(!f.doctors[0].is_available(&slot(10, 9)));
    }

    #[test]
    fn decline_reopens_slot() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.engine.decline_appointment(&mut f.doctors, "D1", &id).unwrap();

        assert_eq!(f.status(&id), AppointmentStatus::Declined);
        assert!(f.doctors[0].is_available(&slot(10, 9)));
        let again = f.engine.decline_appointment(&mut f.doctors, "D1", &id);
        assert!(matches!(again, Err(HmsError::Conflict(_))));
    }

    #[test]
    fn cancel_by_doctor_unlinks_both_sides() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.engine
            .cancel_appointment(&mut f.doctors, &mut f.patients, &id, Caller::Doctor("D1"))
            .unwrap();

        assert_eq!(f.status(&id), AppointmentStatus::Cancelled);
        assert!(!f.doctors[0].has_appointment(&id));
        assert!(!f.patients[0].has_appointment(&id));
        assert!(f.doctors[0].is_available(&slot(10, 9)));
    }

    #[test]
    fn cancel_by_stranger_is_unauthorized() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        for caller in [Caller::Patient("P2"), Caller::Doctor("D2"), Caller::Pharmacist("PH1")] {
            let err = f
                .engine
                .cancel_appointment(&mut f.doctors, &mut f.patients, &id, caller)
                .unwrap_err();
            assert!(matches!(err, HmsError::Unauthorized(_)));
        }
        assert_eq!(f.status(&id), AppointmentStatus::Pending);
        assert!(f.patients[0].has_appointment(&id));
    }

    #[test]
    fn outcome_is_recorded_once() {
        let mut f = fixture();
        let id = f.book("P1", slot(10, 9));
        f.engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D1", &id)
            .unwrap();
        f.engine
            .record_appointment_outcome(&mut f.patients, "D1", "P1", &id, "Checkup", "OK", None)
            .unwrap();
        let second = f
            .engine
            .record_appointment_outcome(&mut f.patients, "D1", "P1", &id, "X-ray", "redo", None);

        assert!(matches!(second, Err(HmsError::Conflict(_))));
        let outcome = f.engine.find_by_id(&id).unwrap().outcome().unwrap();
        assert_eq!(outcome.services, "Checkup");
        assert_eq!(outcome.date, slot(10, 9).date());
        assert_eq!(f.patients[0].medical_record().outcomes().len(), 1);
        assert_eq!(f.status(&id), AppointmentStatus::Confirmed);
    }

    #[test]
    fn completed_future_appointment_counts_as_past() {
        let mut f = fixture();
        let id = f.book("P1", slot(11, 9));
        let other = f.book("P1", slot(10, 10));
        f.engine
            .accept_appointment(&mut f.doctors, &mut f.patients, "D1", &id)
            .unwrap();
        f.engine.mark_completed("D1", &id).unwrap();

        let now = slot(10, 8).datetime();
        let past: Vec<&str> = f.engine.past_at(&f.patients[0], now).into_iter().map(|a| a.id()).collect();
        let upcoming = f.engine.upcoming_at(&f.patients[0], now);
        assert_eq!(past, vec![id.as_str()]);
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming.iter().any(|a| a.id() == other));
    }

    #[test]
    fn all_outcomes_requires_pharmacist() {
        let f = fixture();
        assert!(f.engine.all_outcomes(Caller::Pharmacist("PH1")).unwrap().is_empty());
        assert!(matches!(
            f.engine.all_outcomes(Caller::Doctor("D1")),
            Err(HmsError::Unauthorized(_))
        ));
    }
}
