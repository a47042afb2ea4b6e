use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a reminder is nudging the patient about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderType {
    Appointment,
    HealthTip,
    Medication,
    Other,
}

impl ReminderType {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            ReminderType::Appointment => "Appointment".to_string(),
            ReminderType::HealthTip => "Health Tip".to_string(),
            ReminderType::Medication => "Medication".to_string(),
            ReminderType::Other => "Other".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "Appointment" => Ok(ReminderType::Appointment),
            "Health Tip" => Ok(ReminderType::HealthTip),
            "Medication" => Ok(ReminderType::Medication),
            "Other" => Ok(ReminderType::Other),
            _ => Err(format!("Invalid reminder type: {}", s)),
        }
    }
}

/// Domain model for a scheduled SMS reminder.
///
/// Lifecycle is a single transition: `sent` flips false to true exactly
/// once when a dispatch pass delivers the message, and never reverts.
/// A failed send leaves the reminder unsent so the next pass retries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub patient_id: String,
    pub hospital_id: String,
    pub reminder_type: ReminderType,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub const MAX_MESSAGE_LEN: usize = 300;

    /// Generate a unique ID for a reminder
    pub fn generate_id(timestamp_nanos: i64) -> String {
        format!("reminder::{}", timestamp_nanos)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReminderValidationError {
    #[error("Reminder message cannot be empty")]
    EmptyMessage,
    #[error("Reminder message cannot exceed 300 characters")]
    MessageTooLong,
    #[error("Invalid reminder type: {0}")]
    UnknownType(String),
    #[error("Invalid scheduled time: {0}")]
    InvalidScheduledTime(String),
    #[error("Reminder has already been sent")]
    AlreadySent,
}
