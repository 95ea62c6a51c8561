use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::hospital::Hospital;
use crate::patient::Patient;
use crate::pharmacy::MedicineInventory;
use crate::roles::{Role, StaffMember};
use crate::schedule::parse_date;

/// Finds a column whose header contains `needle`, else uses `fallback`.
fn column(headers: &StringRecord, needle: &str, fallback: usize) -> usize {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(needle))
        .unwrap_or(fallback)
}

fn field<'r>(record: &'r StringRecord, col: usize) -> &'r str {
    record.get(col).unwrap_or("").trim()
}

/// Parses a whole number, None if empty or invalid
fn parse_number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader)
}

/// Reads staff rows: `id,name,role,gender,age`
pub fn read_staff<R: Read>(reader: R) -> Result<Vec<StaffMember>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().context("Failed to read staff header")?.clone();

    let id_col = column(&headers, "id", 0);
    let name_col = column(&headers, "name", 1);
    let role_col = column(&headers, "role", 2);
    let gender_col = column(&headers, "gender", 3);
    let age_col = column(&headers, "age", 4);

    let mut staff = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read staff row {}", line + 2))?;

        let user_id = field(&record, id_col);
        let name = field(&record, name_col);
        // Skip if essential fields are missing
        if user_id.is_empty() || name.is_empty() {
            warn!(row = line + 2, "skipping staff row without id or name");
            continue;
        }
        let role = match field(&record, role_col).parse::<Role>() {
            Ok(role) => role,
            Err(err) => {
                warn!(row = line + 2, user = %user_id, error = %err, "skipping staff row");
                continue;
            }
        };

        staff.push(StaffMember {
            user_id: user_id.to_string(),
            name: name.to_string(),
            gender: field(&record, gender_col).to_string(),
            age: parse_number(field(&record, age_col)).unwrap_or(0),
            role,
        });
    }
    Ok(staff)
}

/// Reads patient rows: `id,name,date_of_birth,gender,blood_type,email[,phone]`
pub fn read_patients<R: Read>(reader: R) -> Result<Vec<Patient>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().context("Failed to read patient header")?.clone();

    let id_col = column(&headers, "id", 0);
    let name_col = column(&headers, "name", 1);
    let dob_col = column(&headers, "birth", 2);
    let gender_col = column(&headers, "gender", 3);
    let blood_col = column(&headers, "blood", 4);
    let email_col = column(&headers, "mail", 5);
    let phone_col = column(&headers, "phone", 6);

    let mut patients = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read patient row {}", line + 2))?;

        let user_id = field(&record, id_col);
        let name = field(&record, name_col);
        if user_id.is_empty() || name.is_empty() {
            warn!(row = line + 2, "skipping patient row without id or name");
            continue;
        }

        let mut patient = Patient::new(user_id, name, field(&record, gender_col));
        patient.blood_type = field(&record, blood_col).to_string();
        patient.date_of_birth = match parse_date(field(&record, dob_col)) {
            Ok(date) => Some(date),
            Err(err) => {
                debug!(patient = %user_id, error = %err, "date of birth not recorded");
                None
            }
        };

        let email = field(&record, email_col);
        let phone = Some(field(&record, phone_col)).filter(|p| !p.is_empty());
        if !email.is_empty() || phone.is_some() {
            if let Err(err) = patient.update_contact(email, phone) {
                warn!(patient = %user_id, error = %err, "contact details not recorded");
            }
        }
        patients.push(patient);
    }
    Ok(patients)
}

/// Reads medicine rows: `name,initial_stock,alert_level`. The first row
/// for a name wins.
pub fn read_medicines<R: Read>(reader: R) -> Result<MedicineInventory> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().context("Failed to read medicine header")?.clone();

    let name_col = column(&headers, "name", 0);
    let stock_col = column(&headers, "stock", 1);
    let alert_col = column(&headers, "alert", 2);

    let mut inventory = MedicineInventory::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read medicine row {}", line + 2))?;

        let name = field(&record, name_col);
        let stock = parse_number(field(&record, stock_col));
        let alert_level = parse_number(field(&record, alert_col));
        let (stock, alert_level) = match (stock, alert_level) {
            (Some(stock), Some(alert)) if !name.is_empty() => (stock, alert),
            _ => {
                warn!(row = line + 2, "skipping medicine row with missing name, stock or alert level");
                continue;
            }
        };

        if let Err(err) = inventory.add(name, stock, alert_level) {
            warn!(row = line + 2, error = %err, "keeping first entry for duplicate medicine");
        }
    }
    Ok(inventory)
}

fn open(path: &Path) -> Result<Option<File>> {
    if !path.exists() {
        warn!(path = %path.display(), "data file not found, continuing without it");
        return Ok(None);
    }
    File::open(path)
        .map(Some)
        .with_context(|| format!("Failed to open {}", path.display()))
}

pub fn load_staff<P: AsRef<Path>>(path: P) -> Result<Vec<StaffMember>> {
    let path = path.as_ref();
    match open(path)? {
        Some(file) => read_staff(file).with_context(|| format!("Failed to load staff from {}", path.display())),
        None => Ok(Vec::new()),
    }
}

pub fn load_patients<P: AsRef<Path>>(path: P) -> Result<Vec<Patient>> {
    let path = path.as_ref();
    match open(path)? {
        Some(file) => read_patients(file).with_context(|| format!("Failed to load patients from {}", path.display())),
        None => Ok(Vec::new()),
    }
}

pub fn load_medicines<P: AsRef<Path>>(path: P) -> Result<MedicineInventory> {
    let path = path.as_ref();
    match open(path)? {
        Some(file) => read_medicines(file).with_context(|| format!("Failed to load medicines from {}", path.display())),
        None => Ok(MedicineInventory::new()),
    }
}

/// Loads the three data files named by `config` into a fresh hospital.
/// Rows that clash with ones already loaded are skipped.
pub fn load_hospital(config: &Config) -> Result<Hospital> {
    let inventory = load_medicines(config.medicine_path())?;
    let mut hospital = Hospital::with_inventory(inventory);

    for member in load_staff(config.staff_path())? {
        let user_id = member.user_id.clone();
        if let Err(err) = hospital.add_staff(member) {
            warn!(user = %user_id, error = %err, "staff member skipped");
        }
    }
    for patient in load_patients(config.patient_path())? {
        let user_id = patient.user_id.clone();
        if let Err(err) = hospital.add_patient(patient) {
            warn!(user = %user_id, error = %err, "patient skipped");
        }
    }

    info!(
        staff = hospital.staff().len(),
        doctors = hospital.doctors().len(),
        patients = hospital.patients().len(),
        medicines = hospital.inventory().medicines().len(),
        "data files loaded"
    );
    Ok(hospital)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_rows_with_unknown_roles_are_skipped() {
        let data = "Staff ID,Name,Role,Gender,Age\n\
                    D001,John Smith,Doctor,Male,45\n\
                    N001,Nina Nurse,Nurse,Female,30\n\
                    P001,Mark Lee,Pharmacist,Male,29\n\
                    ,No Id,Doctor,Male,50\n";
        let staff = read_staff(data.as_bytes()).unwrap();
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[0].role, Role::Doctor);
        assert_eq!(staff[0].age, 45);
        assert_eq!(staff[1].name, "Mark Lee");
    }

    #[test]
    fn patient_columns_are_found_by_header() {
        let data = "Patient ID,Name,Date of Birth,Gender,Blood Type,Contact Information\n\
                    P1001,Alice Brown,1980-05-14,Female,A+,alice.brown@example.com\n\
                    P1002,Bob Stone,not a date,Male,B+,bad-email\n";
        let patients = read_patients(data.as_bytes()).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].email(), "alice.brown@example.com");
        assert_eq!(patients[0].blood_type, "A+");
        assert!(patients[0].date_of_birth.is_some());
        assert!(patients[1].date_of_birth.is_none());
        assert_eq!(patients[1].email(), "");
    }

    #[test]
    fn optional_phone_column_is_read() {
        let data = "id,name,date_of_birth,gender,blood_type,email,phone\n\
                    P1,Alice,1990-01-01,Female,O-,alice@example.com,91234567\n";
        let patients = read_patients(data.as_bytes()).unwrap();
        assert_eq!(patients[0].phone(), Some("91234567"));
    }

    #[test]
    fn duplicate_medicines_keep_first_entry() {
        let data = "Medicine Name,Initial Stock,Low Stock Level Alert\n\
                    Paracetamol,100,20\n\
                    paracetamol,5,1\n\
                    Ibuprofen,,10\n\
                    Amoxicillin,75,15\n";
        let inventory = read_medicines(data.as_bytes()).unwrap();
        assert_eq!(inventory.medicines().len(), 2);
        assert_eq!(inventory.find("Paracetamol").unwrap().stock(), 100);
        assert!(inventory.find("Ibuprofen").is_none());
    }

    #[test]
    fn missing_files_load_as_empty() {
        let config = Config {
            data_dir: "does/not/exist".into(),
            ..Config::default()
        };
        let hospital = load_hospital(&config).unwrap();
        assert!(hospital.staff().is_empty());
        assert!(hospital.inventory().medicines().is_empty());
    }
}
