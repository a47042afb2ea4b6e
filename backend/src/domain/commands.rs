//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are
//! **not** exposed over the public API; the REST layer maps the DTOs in
//! the `shared` crate onto them. Date fields arrive as strings and are
//! parsed (and rejected) by the services.

pub mod patients {
    use crate::domain::models::patient::Patient;

    /// Input for registering a new patient.
    #[derive(Debug, Clone)]
    pub struct CreatePatientCommand {
        pub user_id: Option<String>,
        pub hospital_id: String,
        pub full_name: String,
        pub phone_number: String,
        pub language_preference: Option<String>,
        pub pregnancy_status: String,
        /// Last menstrual period (YYYY-MM-DD); the due date is derived
        pub lmp: String,
        pub registered_by: String,
    }

    /// Partial patient update. There is deliberately no `edd` field:
    /// the due date is derived state and recomputed when `lmp` changes.
    #[derive(Debug, Clone, Default)]
    pub struct UpdatePatientCommand {
        pub patient_id: String,
        pub full_name: Option<String>,
        pub phone_number: Option<String>,
        pub language_preference: Option<String>,
        pub lmp: Option<String>,
        pub updated_by: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreatePatientResult {
        pub patient: Patient,
    }

    #[derive(Debug, Clone)]
    pub struct UpdatePatientResult {
        pub patient: Patient,
    }

    #[derive(Debug, Clone)]
    pub struct DeletePatientResult {
        pub success_message: String,
    }
}

pub mod reminders {
    use crate::domain::models::reminder::Reminder;

    /// Input for scheduling a new reminder.
    #[derive(Debug, Clone)]
    pub struct CreateReminderCommand {
        pub patient_id: String,
        pub hospital_id: String,
        pub reminder_type: String,
        /// Reminder message (max 300 characters)
        pub message: String,
        /// When the reminder becomes due (RFC 3339)
        pub scheduled_time: String,
        pub created_by: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateReminderResult {
        pub reminder: Reminder,
    }

    /// Partial update of a reminder that has not been dispatched yet.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateReminderCommand {
        pub reminder_id: String,
        pub message: Option<String>,
        /// New due time (RFC 3339)
        pub scheduled_time: Option<String>,
        pub updated_by: String,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateReminderResult {
        pub reminder: Reminder,
    }

    /// Outcome of one dispatch pass over due reminders.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct DispatchSummary {
        /// Delivered and marked sent
        pub sent: usize,
        /// Skipped for lack of a contact channel; left unsent
        pub skipped: usize,
        /// Provider refused; left unsent for the next pass
        pub failed: usize,
    }
}

pub mod tips {
    use crate::domain::models::health_tip::HealthTip;

    /// Input for a staff-authored health tip.
    #[derive(Debug, Clone)]
    pub struct CreateTipCommand {
        pub title: String,
        pub content: String,
        pub relevant_week: Option<u32>,
        pub tags: Vec<String>,
        pub created_by: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateTipResult {
        pub tip: HealthTip,
    }
}
