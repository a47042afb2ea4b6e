//! DTO types exchanged between the REST layer and its clients.
//!
//! Dates travel as strings: calendar dates as `YYYY-MM-DD`, timestamps as
//! RFC 3339. The backend parses and validates them; these types stay dumb.

use serde::{Deserialize, Serialize};

/// A registered maternal-health patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDto {
    /// Patient ID in format "patient::<epoch_nanos>"
    pub id: String,
    /// Identity reference to the patient's user account, if one exists
    pub user_id: Option<String>,
    pub hospital_id: String,
    pub full_name: String,
    /// Phone number used as the SMS reminder channel (may be empty)
    pub phone_number: String,
    pub language_preference: String,
    /// "First pregnancy" or "Subsequent pregnancy"
    pub pregnancy_status: String,
    /// Last menstrual period (YYYY-MM-DD)
    pub lmp: String,
    /// Estimated due date, derived from LMP (YYYY-MM-DD)
    pub edd: Option<String>,
    pub registered_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub user_id: Option<String>,
    pub hospital_id: String,
    pub full_name: String,
    pub phone_number: String,
    pub language_preference: Option<String>,
    pub pregnancy_status: String,
    /// Last menstrual period (YYYY-MM-DD); the due date is derived from it
    pub lmp: String,
    pub registered_by: String,
}

/// Partial patient update. The due date is never accepted from clients;
/// it is recomputed whenever `lmp` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub language_preference: Option<String>,
    pub lmp: Option<String>,
}

/// A scheduled SMS reminder for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderDto {
    pub id: String,
    pub patient_id: String,
    pub hospital_id: String,
    /// One of "Appointment", "Health Tip", "Medication", "Other"
    pub reminder_type: String,
    pub message: String,
    /// When the reminder becomes due (RFC 3339)
    pub scheduled_time: String,
    pub sent: bool,
    pub sent_at: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    pub patient_id: String,
    pub hospital_id: String,
    pub reminder_type: String,
    /// Reminder message (max 300 characters)
    pub message: String,
    pub scheduled_time: String,
    pub created_by: String,
}

/// Partial reminder update; only unsent reminders accept changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReminderRequest {
    pub message: Option<String>,
    pub scheduled_time: Option<String>,
}

/// A pregnancy health tip, optionally pinned to a gestational week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTipDto {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Gestational week this tip targets (1-42), absent for general tips
    pub relevant_week: Option<u32>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHealthTipRequest {
    /// Tip title (max 100 characters)
    pub title: String,
    /// Tip body (max 1000 characters)
    pub content: String,
    pub relevant_week: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub created_by: String,
}

/// One audit-trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogDto {
    pub id: String,
    pub actor_id: String,
    pub actor_role: String,
    pub description: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub created_at: String,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub data: Vec<T>,
}

/// Uniform error body returned by the REST layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
