use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "hms=info,hospital_appointments=info";

/// Where the data files live and how the binary behaves on start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub staff_file: String,
    pub patient_file: String,
    pub medicine_file: String,
    pub log_filter: String,
    pub demo_slots: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datafiles"),
            staff_file: "Staff.csv".to_string(),
            patient_file: "Patient.csv".to_string(),
            medicine_file: "Medicine.csv".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            demo_slots: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// defaults for keys that are absent.
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let demo_slots = match get("HMS_DEMO_SLOTS") {
            Some(val) => parse_bool(&val).with_context(|| format!("Failed to parse HMS_DEMO_SLOTS value '{}'", val))?,
            None => defaults.demo_slots,
        };

        Ok(Self {
            data_dir: get("HMS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            staff_file: get("HMS_STAFF_FILE").unwrap_or(defaults.staff_file),
            patient_file: get("HMS_PATIENT_FILE").unwrap_or(defaults.patient_file),
            medicine_file: get("HMS_MEDICINE_FILE").unwrap_or(defaults.medicine_file),
            log_filter: get("HMS_LOG").unwrap_or(defaults.log_filter),
            demo_slots,
        })
    }

    pub fn staff_path(&self) -> PathBuf {
        self.data_dir.join(&self.staff_file)
    }

    pub fn patient_path(&self) -> PathBuf {
        self.data_dir.join(&self.patient_file)
    }

    pub fn medicine_path(&self) -> PathBuf {
        self.data_dir.join(&self.medicine_file)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{}'", other),
    }
}
