use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest gestational week a tip can target.
pub const WEEK_MIN: u32 = 1;
/// Highest gestational week a tip can target.
pub const WEEK_MAX: u32 = 42;

/// Tag marking tips created by the daily generation pass rather than staff.
pub const AUTO_GENERATED_TAG: &str = "auto-generated";

/// Week marker tag attached to generated tips, e.g. "week-20".
pub fn week_tag(week: u32) -> String {
    format!("week-{}", week)
}

/// Domain model for a pregnancy health tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTip {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Gestational week this tip targets (1-42), absent for general tips
    pub relevant_week: Option<u32>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl HealthTip {
    pub const MAX_TITLE_LEN: usize = 100;
    pub const MAX_CONTENT_LEN: usize = 1000;

    /// Generate a unique ID for a health tip
    pub fn generate_id(timestamp_nanos: i64) -> String {
        format!("tip::{}", timestamp_nanos)
    }

    pub fn is_auto_generated(&self) -> bool {
        self.tags.iter().any(|t| t == AUTO_GENERATED_TAG)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TipValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Title cannot exceed 100 characters")]
    TitleTooLong,
    #[error("Content cannot be empty")]
    EmptyContent,
    #[error("Content cannot exceed 1000 characters")]
    ContentTooLong,
    #[error("Relevant week must be between 1 and 42, got {0}")]
    WeekOutOfRange(u32),
}
