//! CSV-backed health tip repository. Tags are stored semicolon-joined in
//! a single column; an empty `relevant_week` column marks a general tip.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::health_tip::HealthTip;
use crate::storage::traits::HealthTipStorage;

const TIPS_FILE: &str = "health_tips.csv";
const HEADER: &str = "id,title,content,relevant_week,tags,created_by,created_at";
const TAG_SEPARATOR: &str = ";";

/// CSV record structure for health tips
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthTipRecord {
    id: String,
    title: String,
    content: String,
    relevant_week: String,
    tags: String,
    created_by: String,
    created_at: String,
}

impl From<HealthTip> for HealthTipRecord {
    fn from(tip: HealthTip) -> Self {
        HealthTipRecord {
            id: tip.id,
            title: tip.title,
            content: tip.content,
            relevant_week: tip.relevant_week.map(|w| w.to_string()).unwrap_or_default(),
            tags: tip.tags.join(TAG_SEPARATOR),
            created_by: tip.created_by,
            created_at: tip.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<HealthTipRecord> for HealthTip {
    type Error = anyhow::Error;

    fn try_from(record: HealthTipRecord) -> Result<Self> {
        let relevant_week = if record.relevant_week.is_empty() {
            None
        } else {
            Some(
                record
                    .relevant_week
                    .parse::<u32>()
                    .with_context(|| format!("Invalid relevant_week in record {}", record.id))?,
            )
        };
        let tags = if record.tags.is_empty() {
            Vec::new()
        } else {
            record.tags.split(TAG_SEPARATOR).map(str::to_string).collect()
        };
        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid timestamp in record {}", record.id))?;

        Ok(HealthTip {
            id: record.id,
            title: record.title,
            content: record.content,
            relevant_week,
            tags,
            created_by: record.created_by,
            created_at,
        })
    }
}

/// CSV-based health tip repository
#[derive(Clone)]
pub struct HealthTipRepository {
    connection: CsvConnection,
}

impl HealthTipRepository {
    /// Create a new CSV health tip repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<HealthTip>> {
        let path = self.connection.ensure_file(TIPS_FILE, HEADER)?;
        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut tips = Vec::new();
        for result in reader.deserialize::<HealthTipRecord>() {
            let record = result.context("Failed to parse health tip record")?;
            tips.push(HealthTip::try_from(record)?);
        }
        Ok(tips)
    }

    fn save_all(&self, tips: &[HealthTip]) -> Result<()> {
        let path = self.connection.file_path(TIPS_FILE);
        let tmp_path = self.connection.file_path(&format!("{}.tmp", TIPS_FILE));

        {
            let mut writer = Writer::from_path(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            for tip in tips {
                writer.serialize(HealthTipRecord::from(tip.clone()))?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &path).context("Failed to replace health tips file")?;
        Ok(())
    }
}

impl HealthTipStorage for HealthTipRepository {
    fn store_tip(&self, tip: &HealthTip) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let mut tips = self.load_all()?;
        if tips.iter().any(|t| t.id == tip.id) {
            return Err(anyhow::anyhow!("Health tip already exists: {}", tip.id));
        }
        tips.push(tip.clone());
        self.save_all(&tips)
    }

    fn get_tip(&self, tip_id: &str) -> Result<Option<HealthTip>> {
        Ok(self.load_all()?.into_iter().find(|t| t.id == tip_id))
    }

    fn list_tips(&self) -> Result<Vec<HealthTip>> {
        let mut tips = self.load_all()?;
        tips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tips)
    }

    fn delete_tip(&self, tip_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_for_write();
        let mut tips = self.load_all()?;
        let before = tips.len();
        tips.retain(|t| t.id != tip_id);
        if tips.len() == before {
            return Ok(false);
        }
        self.save_all(&tips)?;
        Ok(true)
    }

    fn tips_for_week(&self, week: u32) -> Result<Vec<HealthTip>> {
        let mut tips: Vec<HealthTip> = self
            .load_all()?
            .into_iter()
            .filter(|t| t.relevant_week == Some(week))
            .collect();
        tips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tips)
    }

    fn tips_for_weeks(&self, weeks: &[u32]) -> Result<Vec<HealthTip>> {
        let mut tips: Vec<HealthTip> = self
            .load_all()?
            .into_iter()
            .filter(|t| t.relevant_week.map_or(false, |w| weeks.contains(&w)))
            .collect();
        tips.sort_by(|a, b| {
            b.relevant_week
                .cmp(&a.relevant_week)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(tips)
    }

    fn latest_tips(&self, limit: usize) -> Result<Vec<HealthTip>> {
        let mut tips = self.load_all()?;
        tips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tips.truncate(limit);
        Ok(tips)
    }

    fn week_tip_exists_on(&self, week: u32, day: NaiveDate) -> Result<bool> {
        Ok(self.load_all()?.iter().any(|t| {
            t.relevant_week == Some(week) && t.created_at.date_naive() == day
        }))
    }
}
