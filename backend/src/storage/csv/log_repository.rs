//! CSV-backed activity log repository. The audit trail is append-only,
//! so entries are written straight to the end of the file instead of the
//! rewrite cycle the other repositories use.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;

use super::connection::CsvConnection;
use crate::domain::models::log::{ActivityLog, Role};
use crate::storage::traits::LogStorage;

const LOG_FILE: &str = "activity_log.csv";
const HEADER: &str = "id,actor_id,actor_role,description,resource_type,resource_id,created_at";

/// CSV record structure for activity log entries
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActivityLogRecord {
    id: String,
    actor_id: String,
    actor_role: String,
    description: String,
    resource_type: String,
    resource_id: String,
    created_at: String,
}

impl From<ActivityLog> for ActivityLogRecord {
    fn from(entry: ActivityLog) -> Self {
        ActivityLogRecord {
            id: entry.id,
            actor_id: entry.actor_id,
            actor_role: entry.actor_role.to_string(),
            description: entry.description,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id.unwrap_or_default(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<ActivityLogRecord> for ActivityLog {
    type Error = anyhow::Error;

    fn try_from(record: ActivityLogRecord) -> Result<Self> {
        let actor_role = Role::from_string(&record.actor_role)
            .map_err(|e| anyhow::anyhow!("Failed to parse actor role: {}", e))?;
        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid timestamp in record {}", record.id))?;

        Ok(ActivityLog {
            id: record.id,
            actor_id: record.actor_id,
            actor_role,
            description: record.description,
            resource_type: record.resource_type,
            resource_id: if record.resource_id.is_empty() {
                None
            } else {
                Some(record.resource_id)
            },
            created_at,
        })
    }
}

/// CSV-based activity log repository
#[derive(Clone)]
pub struct LogRepository {
    connection: CsvConnection,
}

impl LogRepository {
    /// Create a new CSV activity log repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl LogStorage for LogRepository {
    fn append(&self, entry: &ActivityLog) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let path = self.connection.ensure_file(LOG_FILE, HEADER)?;

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(ActivityLogRecord::from(entry.clone()))?;
        writer.flush()?;
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ActivityLog>> {
        let path = self.connection.ensure_file(LOG_FILE, HEADER)?;
        let mut reader = ReaderBuilder::new()
            .from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut entries = Vec::new();
        for result in reader.deserialize::<ActivityLogRecord>() {
            let record = result.context("Failed to parse activity log record")?;
            entries.push(ActivityLog::try_from(record)?);
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn setup() -> (LogRepository, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        (LogRepository::new(conn), temp_dir)
    }

    fn sample_entry(id: &str, created_at: DateTime<Utc>) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            actor_id: "user::staff1".to_string(),
            actor_role: Role::Staff,
            description: "Created health tip: \"Hydration\"".to_string(),
            resource_type: "HealthTip".to_string(),
            resource_id: Some("tip::1".to_string()),
            created_at,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let (repo, _dir) = setup();
        repo.append(&sample_entry("log::1", Utc::now())).unwrap();

        let entries = repo.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_role, Role::Staff);
        assert_eq!(entries[0].resource_id.as_deref(), Some("tip::1"));
    }

    #[test]
    fn test_recent_orders_newest_first_and_limits() {
        let (repo, _dir) = setup();
        let now = Utc::now();
        for i in 0..5 {
            repo.append(&sample_entry(&format!("log::{}", i), now - Duration::minutes(i))).unwrap();
        }

        let entries = repo.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, "log::0");
        assert_eq!(entries[2].id, "log::2");
    }

    #[test]
    fn test_missing_resource_id_round_trips_as_none() {
        let (repo, _dir) = setup();
        let mut entry = sample_entry("log::none", Utc::now());
        entry.resource_id = None;
        repo.append(&entry).unwrap();

        let entries = repo.recent(1).unwrap();
        assert!(entries[0].resource_id.is_none());
    }
}
