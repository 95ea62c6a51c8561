use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HmsError, HmsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Doctor,
    Pharmacist,
    Patient,
}

/// Actions a role may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ScheduleAppointments,
    ManageAvailability,
    IssuePrescriptions,
    ViewAllOutcomes,
    DispenseMedicine,
    RequestReplenishment,
    ApproveReplenishment,
    ManageStaff,
    ManageInventory,
}

impl Role {
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Administrator => &[ManageStaff, ManageInventory, ApproveReplenishment],
            Role::Doctor => &[ManageAvailability, IssuePrescriptions],
            Role::Pharmacist => &[ViewAllOutcomes, DispenseMedicine, RequestReplenishment],
            Role::Patient => &[ScheduleAppointments],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Patient)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Administrator => "Administrator",
            Role::Doctor => "Doctor",
            Role::Pharmacist => "Pharmacist",
            Role::Patient => "Patient",
        };
        f.pad(label)
    }
}

impl FromStr for Role {
    type Err = HmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "doctor" => Ok(Role::Doctor),
            "pharmacist" => Ok(Role::Pharmacist),
            "patient" => Ok(Role::Patient),
            other => Err(HmsError::validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Identity of whoever is invoking an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller<'a> {
    Administrator(&'a str),
    Doctor(&'a str),
    Pharmacist(&'a str),
    Patient(&'a str),
}

impl<'a> Caller<'a> {
    pub fn new(role: Role, user_id: &'a str) -> Self {
        match role {
            Role::Administrator => Caller::Administrator(user_id),
            Role::Doctor => Caller::Doctor(user_id),
            Role::Pharmacist => Caller::Pharmacist(user_id),
            Role::Patient => Caller::Patient(user_id),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Caller::Administrator(_) => Role::Administrator,
            Caller::Doctor(_) => Role::Doctor,
            Caller::Pharmacist(_) => Role::Pharmacist,
            Caller::Patient(_) => Role::Patient,
        }
    }

    pub fn user_id(&self) -> &'a str {
        match *self {
            Caller::Administrator(id)
            | Caller::Doctor(id)
            | Caller::Pharmacist(id)
            | Caller::Patient(id) => id,
        }
    }

    pub fn require(&self, capability: Capability) -> HmsResult<()> {
        if self.role().can(capability) {
            Ok(())
        } else {
            Err(HmsError::unauthorized(format!(
                "{} {} may not {:?}",
                self.role(),
                self.user_id(),
                capability
            )))
        }
    }
}

/// Administrators and pharmacists. Doctors carry their own schedule state
/// and live in [`crate::schedule::Doctor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub user_id: String,
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pharmacists_view_all_outcomes() {
        assert!(Role::Pharmacist.can(Capability::ViewAllOutcomes));
        assert!(!Role::Doctor.can(Capability::ViewAllOutcomes));
        assert!(!Role::Administrator.can(Capability::ViewAllOutcomes));
        assert!(!Role::Patient.can(Capability::ViewAllOutcomes));
    }

    #[test]
    fn caller_require_reports_unauthorized() {
        let caller = Caller::Doctor("D1");
        assert!(caller.require(Capability::IssuePrescriptions).is_ok());
        assert!(matches!(
            caller.require(Capability::ApproveReplenishment),
            Err(HmsError::Unauthorized(_))
        ));
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" Pharmacist ".parse::<Role>().unwrap(), Role::Pharmacist);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Administrator);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn caller_round_trips_role_and_id() {
        let caller = Caller::new(Role::Patient, "P7");
        assert_eq!(caller, Caller::Patient("P7"));
        assert_eq!(caller.role(), Role::Patient);
        assert_eq!(caller.user_id(), "P7");
    }
}
