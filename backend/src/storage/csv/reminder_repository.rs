//! CSV-backed reminder repository.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::reminder::{Reminder, ReminderType};
use crate::storage::traits::ReminderStorage;

const REMINDERS_FILE: &str = "reminders.csv";
const HEADER: &str = "id,patient_id,hospital_id,reminder_type,message,scheduled_time,sent,sent_at,created_by,created_at";

/// CSV record structure for reminders
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReminderRecord {
    id: String,
    patient_id: String,
    hospital_id: String,
    reminder_type: String,
    message: String,
    scheduled_time: String,
    sent: bool,
    sent_at: String,
    created_by: String,
    created_at: String,
}

impl From<Reminder> for ReminderRecord {
    fn from(reminder: Reminder) -> Self {
        ReminderRecord {
            id: reminder.id,
            patient_id: reminder.patient_id,
            hospital_id: reminder.hospital_id,
            reminder_type: reminder.reminder_type.to_string(),
            message: reminder.message,
            scheduled_time: reminder.scheduled_time.to_rfc3339(),
            sent: reminder.sent,
            sent_at: reminder.sent_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            created_by: reminder.created_by,
            created_at: reminder.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<ReminderRecord> for Reminder {
    type Error = anyhow::Error;

    fn try_from(record: ReminderRecord) -> Result<Self> {
        let reminder_type = ReminderType::from_string(&record.reminder_type)
            .map_err(|e| anyhow::anyhow!("Failed to parse reminder type: {}", e))?;
        let scheduled_time = parse_timestamp(&record.scheduled_time, &record.id)?;
        let sent_at = if record.sent_at.is_empty() {
            None
        } else {
            Some(parse_timestamp(&record.sent_at, &record.id)?)
        };

        Ok(Reminder {
            id: record.id.clone(),
            patient_id: record.patient_id,
            hospital_id: record.hospital_id,
            reminder_type,
            message: record.message,
            scheduled_time,
            sent: record.sent,
            sent_at,
            created_by: record.created_by,
            created_at: parse_timestamp(&record.created_at, &record.id)?,
        })
    }
}

fn parse_timestamp(value: &str, record_id: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in record {}", record_id))
}

/// CSV-based reminder repository
#[derive(Clone)]
pub struct ReminderRepository {
    connection: CsvConnection,
}

impl ReminderRepository {
    /// Create a new CSV reminder repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<Reminder>> {
        let path = self.connection.ensure_file(REMINDERS_FILE, HEADER)?;
        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut reminders = Vec::new();
        for result in reader.deserialize::<ReminderRecord>() {
            let record = result.context("Failed to parse reminder record")?;
            reminders.push(Reminder::try_from(record)?);
        }
        Ok(reminders)
    }

    fn save_all(&self, reminders: &[Reminder]) -> Result<()> {
        let path = self.connection.file_path(REMINDERS_FILE);
        let tmp_path = self.connection.file_path(&format!("{}.tmp", REMINDERS_FILE));

        {
            let mut writer = Writer::from_path(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            for reminder in reminders {
                writer.serialize(ReminderRecord::from(reminder.clone()))?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &path).context("Failed to replace reminders file")?;
        Ok(())
    }
}

impl ReminderStorage for ReminderRepository {
    fn store_reminder(&self, reminder: &Reminder) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let mut reminders = self.load_all()?;
        if reminders.iter().any(|r| r.id == reminder.id) {
            return Err(anyhow::anyhow!("Reminder already exists: {}", reminder.id));
        }
        reminders.push(reminder.clone());
        self.save_all(&reminders)
    }

    fn get_reminder(&self, reminder_id: &str) -> Result<Option<Reminder>> {
        Ok(self.load_all()?.into_iter().find(|r| r.id == reminder_id))
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>> {
        let mut reminders = self.load_all()?;
        reminders.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        Ok(reminders)
    }

    fn list_reminders_for_patient(&self, patient_id: &str) -> Result<Vec<Reminder>> {
        let mut reminders: Vec<Reminder> = self
            .load_all()?
            .into_iter()
            .filter(|r| r.patient_id == patient_id)
            .collect();
        reminders.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        Ok(reminders)
    }

    fn update_reminder(&self, reminder: &Reminder) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let mut reminders = self.load_all()?;
        let slot = reminders
            .iter_mut()
            .find(|r| r.id == reminder.id)
            .ok_or_else(|| anyhow::anyhow!("Reminder not found: {}", reminder.id))?;
        *slot = reminder.clone();
        self.save_all(&reminders)
    }

    fn delete_reminder(&self, reminder_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_for_write();
        let mut reminders = self.load_all()?;
        let before = reminders.len();
        reminders.retain(|r| r.id != reminder_id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.save_all(&reminders)?;
        Ok(true)
    }

    fn due_unsent(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let mut due: Vec<Reminder> = self
            .load_all()?
            .into_iter()
            .filter(|r| !r.sent && r.scheduled_time <= now)
            .collect();
        due.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn setup() -> (ReminderRepository, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        (ReminderRepository::new(conn), temp_dir)
    }

    fn sample_reminder(id: &str, scheduled_time: DateTime<Utc>, sent: bool) -> Reminder {
        Reminder {
            id: id.to_string(),
            patient_id: "patient::1".to_string(),
            hospital_id: "hospital::1".to_string(),
            reminder_type: ReminderType::Appointment,
            message: "Antenatal clinic visit tomorrow at 9 AM".to_string(),
            scheduled_time,
            sent,
            sent_at: if sent { Some(scheduled_time) } else { None },
            created_by: "user::staff1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_trip() {
        let (repo, _dir) = setup();
        let reminder = sample_reminder("reminder::1", Utc::now(), false);
        repo.store_reminder(&reminder).unwrap();

        let loaded = repo.get_reminder("reminder::1").unwrap().unwrap();
        assert_eq!(loaded.reminder_type, ReminderType::Appointment);
        assert!(!loaded.sent);
        assert!(loaded.sent_at.is_none());
    }

    #[test]
    fn test_due_unsent_filters_sent_and_future() {
        let (repo, _dir) = setup();
        let now = Utc::now();
        repo.store_reminder(&sample_reminder("reminder::due", now - Duration::minutes(5), false)).unwrap();
        repo.store_reminder(&sample_reminder("reminder::sent", now - Duration::minutes(10), true)).unwrap();
        repo.store_reminder(&sample_reminder("reminder::future", now + Duration::hours(1), false)).unwrap();

        let due = repo.due_unsent(now).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "reminder::due");
    }

    #[test]
    fn test_update_marks_sent() {
        let (repo, _dir) = setup();
        let now = Utc::now();
        let mut reminder = sample_reminder("reminder::2", now - Duration::minutes(1), false);
        repo.store_reminder(&reminder).unwrap();

        reminder.sent = true;
        reminder.sent_at = Some(now);
        repo.update_reminder(&reminder).unwrap();

        let loaded = repo.get_reminder("reminder::2").unwrap().unwrap();
        assert!(loaded.sent);
        assert!(loaded.sent_at.is_some());
        assert!(repo.due_unsent(now).unwrap().is_empty());
    }

    #[test]
    fn test_list_for_patient() {
        let (repo, _dir) = setup();
        let now = Utc::now();
        let mut other = sample_reminder("reminder::other", now, false);
        other.patient_id = "patient::2".to_string();
        repo.store_reminder(&sample_reminder("reminder::mine", now, false)).unwrap();
        repo.store_reminder(&other).unwrap();

        let mine = repo.list_reminders_for_patient("patient::1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "reminder::mine");
    }
}
