use hospital_appointments::pharmacy::{MedicineInventory, PrescriptionItem, PrescriptionStatus};
use hospital_appointments::schedule::parse_slot;
use hospital_appointments::{Caller, HmsError, Hospital, Patient, Role, StaffMember};

fn member(id: &str, name: &str, role: Role) -> StaffMember {
    StaffMember {
        user_id: id.to_string(),
        name: name.to_string(),
        gender: "Female".to_string(),
        age: 35,
        role,
    }
}

fn hospital(inventory: MedicineInventory) -> Hospital {
    let mut hospital = Hospital::with_inventory(inventory);
    hospital.add_staff(member("A1", "Sarah Lee", Role::Administrator)).unwrap();
    hospital.add_staff(member("D1", "John Smith", Role::Doctor)).unwrap();
    hospital.add_staff(member("PH1", "Mark Lee", Role::Pharmacist)).unwrap();
    hospital.add_patient(Patient::new("P1", "Alice Brown", "Female")).unwrap();
    hospital
}

#[test]
fn replenishment_approval_is_one_way() {
    let mut inventory = MedicineInventory::new();
    inventory.add("Paracetamol", 5, 10).unwrap();
    let mut hospital = hospital(inventory);

    assert!(hospital.inventory().needs_replenishment("Paracetamol").unwrap());
    let request = hospital
        .submit_replenishment_request(Caller::Pharmacist("PH1"), "Paracetamol", 40)
        .unwrap();

    assert_eq!(hospital.approve_replenishment(Caller::Administrator("A1"), &request).unwrap(), 45);
    assert!(hospital.replenishments().find(&request).unwrap().is_approved());

    let second = hospital.approve_replenishment(Caller::Administrator("A1"), &request);
    assert!(matches!(second, Err(HmsError::Conflict(_))));
    assert_eq!(hospital.inventory().find("Paracetamol").unwrap().stock(), 45);
    assert!(hospital.replenishments().pending().is_empty());
}

#[test]
fn dispense_is_not_rolled_back_when_second_item_is_short() {
    let mut inventory = MedicineInventory::new();
    inventory.add("Paracetamol", 100, 10).unwrap();
    inventory.add("Ibuprofen", 2, 1).unwrap();
    let mut hospital = hospital(inventory);

    let slot = parse_slot("2025-01-10", "09:00").unwrap();
    hospital.add_availability("D1", slot).unwrap();
    let appointment = hospital.schedule_appointment("P1", "D1", slot).unwrap();
    hospital.accept_appointment("D1", &appointment).unwrap();
    let prescription = hospital
        .issue_prescription(
            "D1",
            "P1",
            vec![PrescriptionItem::new("Paracetamol", 10), PrescriptionItem::new("Ibuprofen", 5)],
        )
        .unwrap();

    let err = hospital
        .dispense_prescription(Caller::Pharmacist("PH1"), &prescription)
        .unwrap_err();

    assert_eq!(
        err,
        HmsError::InsufficientStock {
            medicine: "Ibuprofen".to_string(),
            requested: 5,
            available: 2
        }
    );
    assert_eq!(hospital.inventory().find("Paracetamol").unwrap().stock(), 90);
    assert_eq!(hospital.inventory().find("Ibuprofen").unwrap().stock(), 2);
    assert_eq!(
        hospital.prescriptions().find(&prescription).unwrap().status(),
        PrescriptionStatus::Dispensed
    );
}

#[test]
fn all_outcomes_are_for_pharmacists_only() {
    let mut hospital = hospital(MedicineInventory::new());
    let slot = parse_slot("2025-01-10", "09:00").unwrap();
    hospital.add_availability("D1", slot).unwrap();
    let appointment = hospital.schedule_appointment("P1", "D1", slot).unwrap();
    hospital.accept_appointment("D1", &appointment).unwrap();
    hospital
        .complete_appointment("D1", &appointment, "Checkup", "OK", None)
        .unwrap();

    assert_eq!(hospital.all_outcomes(Caller::Pharmacist("PH1")).unwrap().len(), 1);
    assert!(matches!(
        hospital.all_outcomes(Caller::Administrator("A1")),
        Err(HmsError::Unauthorized(_))
    ));
}
