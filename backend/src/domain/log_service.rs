use anyhow::Result;
use chrono::Utc;
use log::{debug, error};
use std::sync::Arc;

use crate::domain::models::log::{ActivityLog, Role, SYSTEM_ERROR_ACTOR_ID};
use crate::storage::csv::{CsvConnection, LogRepository};
use crate::storage::traits::LogStorage;

/// Service for the audit trail.
///
/// Writes are fire-and-forget: a failed log write must never fail the
/// business operation that triggered it, so errors are swallowed here
/// and only reported through the process log.
#[derive(Clone)]
pub struct LogService {
    log_repository: LogRepository,
}

impl LogService {
    /// Create a new LogService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let log_repository = LogRepository::new((*csv_conn).clone());
        Self { log_repository }
    }

    /// Record an activity entry. Never fails the caller.
    pub fn log_activity(
        &self,
        actor_id: &str,
        actor_role: Role,
        description: &str,
        resource_type: &str,
        resource_id: Option<&str>,
    ) {
        let now = Utc::now();
        let entry = ActivityLog {
            id: ActivityLog::generate_id(now.timestamp_nanos_opt().unwrap_or_default()),
            actor_id: actor_id.to_string(),
            actor_role,
            description: description.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.map(str::to_string),
            created_at: now,
        };

        debug!("Logging activity: {} - {}", actor_id, description);
        if let Err(err) = self.log_repository.append(&entry) {
            error!("Activity log write failed for actor {}: {:#}", actor_id, err);
        }
    }

    /// Record a caught batch failure under the system-error actor.
    pub fn log_system_error(&self, description: &str) {
        self.log_activity(
            SYSTEM_ERROR_ACTOR_ID,
            Role::System,
            description,
            "SystemError",
            None,
        );
    }

    /// The most recent audit entries, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ActivityLog>> {
        self.log_repository.recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_activity_and_read_back() {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let service = LogService::new(conn);

        service.log_activity(
            "user::staff1",
            Role::Staff,
            "Created reminder",
            "Reminder",
            Some("reminder::1"),
        );
        service.log_system_error("Failed to send reminders: provider down");

        let entries = service.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.actor_id == "user::staff1"));
        assert!(entries
            .iter()
            .any(|e| e.actor_id == SYSTEM_ERROR_ACTOR_ID && e.resource_type == "SystemError"));
    }

    #[test]
    fn test_log_failure_is_swallowed() {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let service = LogService::new(conn.clone());

        // Replace the log file with a directory so appends fail
        std::fs::create_dir(conn.file_path("activity_log.csv")).unwrap();

        // Must not panic or propagate
        service.log_activity("user::staff1", Role::Staff, "noop", "Reminder", None);
    }
}
