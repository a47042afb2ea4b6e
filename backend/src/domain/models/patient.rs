use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether this is the patient's first tracked pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PregnancyStatus {
    First,
    Subsequent,
}

impl PregnancyStatus {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            PregnancyStatus::First => "First pregnancy".to_string(),
            PregnancyStatus::Subsequent => "Subsequent pregnancy".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "First pregnancy" => Ok(PregnancyStatus::First),
            "Subsequent pregnancy" => Ok(PregnancyStatus::Subsequent),
            _ => Err(format!("Invalid pregnancy status: {}", s)),
        }
    }
}

/// Domain model for a registered patient.
///
/// `edd` is derived state: the patient service recomputes it from `lmp`
/// on every write that sets or changes `lmp`, and clients cannot set it
/// directly. A `None` value means the record predates pregnancy dating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    /// Identity reference to the patient's user account, if one exists
    pub user_id: Option<String>,
    pub hospital_id: String,
    pub full_name: String,
    /// SMS delivery channel; reminders are skipped while this is empty
    pub phone_number: String,
    pub language_preference: String,
    pub pregnancy_status: PregnancyStatus,
    /// Last menstrual period, the baseline for pregnancy dating
    pub lmp: NaiveDate,
    /// Estimated due date, derived from `lmp`
    pub edd: Option<NaiveDate>,
    pub registered_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Generate a unique ID for a patient
    pub fn generate_id(timestamp_nanos: i64) -> String {
        format!("patient::{}", timestamp_nanos)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientValidationError {
    #[error("Patient full name cannot be empty")]
    EmptyName,
    #[error("Patient full name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Hospital reference cannot be empty")]
    EmptyHospital,
}
