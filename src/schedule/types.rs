use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{HmsError, HmsResult};

/// A bookable unit of doctor time. Two slots are the same only when both the
/// date and the time match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    date: NaiveDate,
    time: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Declined,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Statuses reachable in one step from `self`. Terminal statuses have none.
    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Pending => &[Confirmed, Declined, Cancelled],
            Confirmed => &[Cancelled, Completed],
            Declined | Cancelled | Completed => &[],
        }
    }

    /// Pending and Confirmed appointments hold their slot.
    pub fn holds_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Declined => "Declined",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

/// Clinical record of what happened during an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentOutcome {
    pub appointment_id: String,
    pub services: String,
    pub notes: String,
    pub prescription_id: Option<String>,
    pub date: NaiveDate,
}

/// An appointment between one patient and one doctor.
///
/// Fields are private: status only moves along
/// [`AppointmentStatus::valid_transitions`] and an outcome, once attached,
/// is never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: String,
    patient_id: String,
    doctor_id: String,
    slot: TimeSlot,
    status: AppointmentStatus,
    outcome: Option<AppointmentOutcome>,
}

impl Appointment {
    pub fn new(id: String, patient_id: String, doctor_id: String, slot: TimeSlot) -> Self {
        Self {
            id,
            patient_id,
            doctor_id,
            slot,
            status: AppointmentStatus::Pending,
            outcome: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn doctor_id(&self) -> &str {
        &self.doctor_id
    }

    pub fn slot(&self) -> TimeSlot {
        self.slot
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<&AppointmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.slot.datetime() < now
    }

    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.slot.datetime() > now
    }

    pub(crate) fn transition(&mut self, next: AppointmentStatus) -> HmsResult<()> {
        if !self.status.valid_transitions().contains(&next) {
            return Err(HmsError::conflict(format!(
                "appointment {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub(crate) fn set_slot(&mut self, slot: TimeSlot) {
        self.slot = slot;
    }

    pub(crate) fn attach_outcome(&mut self, outcome: AppointmentOutcome) -> HmsResult<()> {
        if self.outcome.is_some() {
            return Err(HmsError::conflict(format!(
                "appointment {} already has an outcome",
                self.id
            )));
        }
        self.outcome = Some(outcome);
        Ok(())
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Appointment {}, Time: {}, Status: {}",
            self.id, self.slot, self.status
        )
    }
}
