//! Storage abstraction traits.
//!
//! The domain layer depends on these document-store-style interfaces
//! (find by id, find by filter, create, update) so storage backends can
//! be swapped without touching the services.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::health_tip::HealthTip;
use crate::domain::models::log::ActivityLog;
use crate::domain::models::patient::Patient;
use crate::domain::models::reminder::Reminder;

/// Trait defining the interface for patient storage operations
pub trait PatientStorage: Send + Sync {
    /// Store a new patient
    fn store_patient(&self, patient: &Patient) -> Result<()>;

    /// Retrieve a specific patient by ID
    fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>>;

    /// List all patients ordered by full name
    fn list_patients(&self) -> Result<Vec<Patient>>;

    /// Update an existing patient
    fn update_patient(&self, patient: &Patient) -> Result<()>;

    /// Delete a patient by ID
    /// Returns true if the patient was found and deleted, false otherwise
    fn delete_patient(&self, patient_id: &str) -> Result<bool>;
}

/// Trait defining the interface for health tip storage operations
pub trait HealthTipStorage: Send + Sync {
    /// Store a new health tip
    fn store_tip(&self, tip: &HealthTip) -> Result<()>;

    /// Retrieve a specific tip by ID
    fn get_tip(&self, tip_id: &str) -> Result<Option<HealthTip>>;

    /// List all tips, most recently created first
    fn list_tips(&self) -> Result<Vec<HealthTip>>;

    /// Delete a tip by ID
    /// Returns true if the tip was found and deleted, false otherwise
    fn delete_tip(&self, tip_id: &str) -> Result<bool>;

    /// All tips targeting exactly this week, most recent first
    fn tips_for_week(&self, week: u32) -> Result<Vec<HealthTip>>;

    /// All tips whose week is in the given set, ordered by week descending
    /// then created_at descending
    fn tips_for_weeks(&self, weeks: &[u32]) -> Result<Vec<HealthTip>>;

    /// The `limit` most recently created tips regardless of week
    fn latest_tips(&self, limit: usize) -> Result<Vec<HealthTip>>;

    /// Whether a tip for this week was already created on the given
    /// calendar day (the generation dedup key)
    fn week_tip_exists_on(&self, week: u32, day: NaiveDate) -> Result<bool>;
}

/// Trait defining the interface for reminder storage operations
pub trait ReminderStorage: Send + Sync {
    /// Store a new reminder
    fn store_reminder(&self, reminder: &Reminder) -> Result<()>;

    /// Retrieve a specific reminder by ID
    fn get_reminder(&self, reminder_id: &str) -> Result<Option<Reminder>>;

    /// List all reminders, soonest scheduled first
    fn list_reminders(&self) -> Result<Vec<Reminder>>;

    /// List reminders for a specific patient, soonest scheduled first
    fn list_reminders_for_patient(&self, patient_id: &str) -> Result<Vec<Reminder>>;

    /// Update an existing reminder
    fn update_reminder(&self, reminder: &Reminder) -> Result<()>;

    /// Delete a reminder by ID
    /// Returns true if the reminder was found and deleted, false otherwise
    fn delete_reminder(&self, reminder_id: &str) -> Result<bool>;

    /// Reminders that are due (`scheduled_time <= now`) and not yet sent
    fn due_unsent(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>>;
}

/// Trait defining the interface for activity log storage operations
pub trait LogStorage: Send + Sync {
    /// Append one entry to the audit trail
    fn append(&self, entry: &ActivityLog) -> Result<()>;

    /// The `limit` most recent entries, newest first
    fn recent(&self, limit: usize) -> Result<Vec<ActivityLog>>;
}
