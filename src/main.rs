use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hospital_appointments::display::{
    format_doctor_name, print_appointments, print_availability, print_inventory, print_outcomes,
    print_prescriptions, print_requests, print_staff, write_report_to_file,
};
use hospital_appointments::parser::load_hospital;
use hospital_appointments::pharmacy::PrescriptionItem;
use hospital_appointments::schedule::TimeSlot;
use hospital_appointments::{Caller, Config, HmsResult, Hospital, Role};

#[derive(Parser)]
#[command(name = "hms")]
#[command(version)]
#[command(about = "Hospital appointments, records and pharmacy stock", long_about = None)]
struct Cli {
    /// Directory holding Staff.csv, Patient.csv and Medicine.csv
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. "hms=debug"
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every staff member
    Staff,

    /// Show medicine stock and alert levels
    Inventory,

    /// Show a doctor's open slots
    Slots {
        #[arg(short, long)]
        doctor: String,
    },

    /// Book, accept, complete and dispense one appointment end to end
    Walkthrough,

    /// Write a JSON snapshot of the loaded data
    Report {
        #[arg(short, long, default_value = "hms_report.json")]
        output: PathBuf,
    },
}

fn init_tracing(cli_filter: Option<&str>, default_filter: &str) -> Result<()> {
    let filter = match cli_filter {
        Some(filter) => EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter '{}'", filter))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

/// Opens two 09:30 slots, tomorrow and the day after, for the first doctor.
fn add_demo_slots(hospital: &mut Hospital) -> Result<()> {
    let Some(doctor_id) = hospital.doctors().first().map(|d| d.user_id.clone()) else {
        warn!("no doctors loaded, demo slots not added");
        return Ok(());
    };
    let time = NaiveTime::from_hms_opt(9, 30, 0).context("Invalid demo slot time")?;
    let today = Local::now().date_naive();
    let slots = [1, 2].map(|days| TimeSlot::new(today + Duration::days(days), time));
    let added = hospital.add_availability_range(&doctor_id, slots)?;
    info!(doctor = %doctor_id, added, "demo slots added");
    Ok(())
}

/// Prints the outcome of one walkthrough step and passes the value on.
fn step<T>(label: &str, result: HmsResult<T>) -> Option<T> {
    match result {
        Ok(value) => {
            println!("✓ {}", label);
            Some(value)
        }
        Err(err) => {
            println!("✗ {}: {}", label, err);
            None
        }
    }
}

fn walkthrough(hospital: &mut Hospital) {
    let doctor = hospital.doctors().first().map(|d| (d.user_id.clone(), format_doctor_name(d)));
    let patient_id = hospital.patients().first().map(|p| p.user_id.clone());
    let (Some((doctor_id, doctor_name)), Some(patient_id)) = (doctor, patient_id) else {
        println!("Notice: the walkthrough needs at least one doctor and one patient");
        return;
    };
    let pharmacist_id = hospital.staff_by_role(Role::Pharmacist).first().map(|s| s.user_id.clone());
    let admin_id = hospital.staff_by_role(Role::Administrator).first().map(|s| s.user_id.clone());

    println!("\n=== Walkthrough: {} with patient {} ===", doctor_name, patient_id);
    if let Ok(doctor) = hospital.doctor(&doctor_id) {
        print_availability(doctor);
    }
    let Some(slot) = hospital.available_slots(&doctor_id).ok().and_then(|s| s.first().copied()) else {
        println!("Notice: {} has no open slots", doctor_name);
        return;
    };

    let Some(appointment_id) = step(
        &format!("Scheduled {} for {}", slot, patient_id),
        hospital.schedule_appointment(&patient_id, &doctor_id, slot),
    ) else {
        return;
    };
    if step("Accepted appointment", hospital.accept_appointment(&doctor_id, &appointment_id)).is_none() {
        return;
    }

    let items = hospital
        .inventory()
        .medicines()
        .first()
        .map(|m| vec![PrescriptionItem::new(m.name(), 1)]);
    let prescription_id = step(
        "Recorded outcome and completed appointment",
        hospital.complete_appointment(&doctor_id, &appointment_id, "Consultation", "Routine checkup", items),
    )
    .flatten();

    if let (Some(pharmacist), Some(prescription)) = (pharmacist_id.as_deref(), prescription_id.as_deref()) {
        if let Some(report) = step(
            &format!("Dispensed {}", prescription),
            hospital.dispense_prescription(Caller::Pharmacist(pharmacist), prescription),
        ) {
            for medicine in &report.needs_replenishment {
                println!("  ⚠️  {} needs replenishment", medicine);
            }
        }
    }

    if let Some(pharmacist) = pharmacist_id.as_deref() {
        let low: Vec<String> = hospital
            .inventory()
            .low_stock()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        for medicine in low {
            let Some(request_id) = step(
                &format!("Requested replenishment of {}", medicine),
                hospital.submit_replenishment_request(Caller::Pharmacist(pharmacist), &medicine, 50),
            ) else {
                continue;
            };
            if let Some(admin) = admin_id.as_deref() {
                step(
                    &format!("Approved request {}", request_id),
                    hospital.approve_replenishment(Caller::Administrator(admin), &request_id),
                );
            }
        }
    }

    if let Ok(patient) = hospital.patient(&patient_id) {
        print_appointments("Upcoming appointments", &hospital.appointments().upcoming(patient));
        print_appointments("Past appointments", &hospital.appointments().past(patient));
    }
    if let Ok(outcomes) = hospital.outcomes_for_patient(&patient_id) {
        print_outcomes("Appointment outcomes", &outcomes);
    }
    print_prescriptions(&hospital.prescriptions().all());
    print_inventory(hospital.inventory());
    print_requests(hospital.replenishments().all());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(cli.log.as_deref(), &config.log_filter)?;

    println!("Loading data from {}...", config.data_dir.display());
    let mut hospital = load_hospital(&config)?;
    if config.demo_slots {
        add_demo_slots(&mut hospital)?;
    }

    match cli.command.unwrap_or(Commands::Walkthrough) {
        Commands::Staff => print_staff(hospital.staff()),
        Commands::Inventory => print_inventory(hospital.inventory()),
        Commands::Slots { doctor } => {
            let doctor = hospital.doctor(&doctor)?;
            print_availability(doctor);
        }
        Commands::Walkthrough => walkthrough(&mut hospital),
        Commands::Report { output } => {
            write_report_to_file(&hospital, &output)?;
            println!("Report saved to {}", output.display());
        }
    }

    Ok(())
}
