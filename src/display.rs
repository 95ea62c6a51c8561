use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::hospital::Hospital;
use crate::pharmacy::{Medicine, MedicineInventory, Prescription, ReplenishmentRequest};
use crate::roles::StaffMember;
use crate::schedule::{Appointment, AppointmentOutcome, Doctor};

/// Formats a doctor as "Dr. name (id)"
pub fn format_doctor_name(doctor: &Doctor) -> String {
    format!("Dr. {} ({})", doctor.name, doctor.user_id)
}

pub fn print_staff(staff: &[StaffMember]) {
    println!("\n=== Staff ({}) ===", staff.len());
    for member in staff {
        println!(
            "  {:<8} {:<24} {:<14} {:<8} {}",
            member.user_id, member.name, member.role, member.gender, member.age
        );
    }
}

/// Prints a doctor's open slots in date order
pub fn print_availability(doctor: &Doctor) {
    let mut slots = doctor.availability().to_vec();
    slots.sort();

    println!("\n=== Availability for {} ===", format_doctor_name(doctor));
    if slots.is_empty() {
        println!("  No open slots");
        return;
    }
    for (index, slot) in slots.iter().enumerate() {
        println!("  {}. {}", index + 1, slot);
    }
}

pub fn print_appointments(title: &str, appointments: &[&Appointment]) {
    println!("\n=== {} ===", title);
    if appointments.is_empty() {
        println!("  No appointments found");
        return;
    }
    for appointment in appointments {
        println!(
            "  {} (Patient: {}, Doctor: {})",
            appointment,
            appointment.patient_id(),
            appointment.doctor_id()
        );
    }
}

pub fn print_outcomes(title: &str, outcomes: &[&AppointmentOutcome]) {
    println!("\n=== {} ===", title);
    if outcomes.is_empty() {
        println!("  No outcomes recorded");
        return;
    }
    for outcome in outcomes {
        println!("  Appointment {} on {}", outcome.appointment_id, outcome.date);
        println!("    Services: {}", outcome.services);
        println!("    Notes: {}", outcome.notes);
        if let Some(prescription) = &outcome.prescription_id {
            println!("    Prescription: {}", prescription);
        }
    }
}

fn stock_flag(medicine: &Medicine) -> &'static str {
    if medicine.needs_replenishment() {
        "⚠️  LOW"
    } else {
        ""
    }
}

pub fn print_inventory(inventory: &MedicineInventory) {
    println!("\n=== Medicine Inventory ===");
    println!("  {:<20} {:>8} {:>8}", "Medicine", "Stock", "Alert");
    for medicine in inventory.medicines() {
        println!(
            "  {:<20} {:>8} {:>8} {}",
            medicine.name(),
            medicine.stock(),
            medicine.alert_level(),
            stock_flag(medicine)
        );
    }
}

pub fn print_requests(requests: &[ReplenishmentRequest]) {
    println!("\n=== Replenishment Requests ===");
    if requests.is_empty() {
        println!("  No requests");
        return;
    }
    for request in requests {
        let state = if request.is_approved() { "Approved" } else { "Pending" };
        println!(
            "  {} {} x{} by {} ({}) [{}]",
            request.id, request.medicine, request.requested_amount, request.requester_name, request.requester_id, state
        );
    }
}

pub fn print_prescriptions(prescriptions: &[Prescription]) {
    println!("\n=== Prescriptions ===");
    if prescriptions.is_empty() {
        println!("  No prescriptions");
        return;
    }
    for prescription in prescriptions {
        let items: Vec<String> = prescription
            .items()
            .iter()
            .map(|item| format!("{} x{}", item.medicine, item.quantity))
            .collect();
        println!("  {} [{}] {}", prescription.id(), prescription.status(), items.join(", "));
    }
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    appointments: &'a [Appointment],
    inventory: &'a [Medicine],
    prescriptions: Vec<Prescription>,
    replenishment_requests: &'a [ReplenishmentRequest],
}

/// Writes a JSON snapshot of appointments and pharmacy state
pub fn write_report_to_file<P: AsRef<Path>>(hospital: &Hospital, filename: P) -> Result<()> {
    let filename = filename.as_ref();
    let report = Report {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        appointments: hospital.appointments().appointments(),
        inventory: hospital.inventory().medicines(),
        prescriptions: hospital.prescriptions().all(),
        replenishment_requests: hospital.replenishments().all(),
    };

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    let mut file = File::create(filename).with_context(|| format!("Failed to create {}", filename.display()))?;
    writeln!(file, "{}", json).with_context(|| format!("Failed to write {}", filename.display()))?;
    Ok(())
}
