use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor roles recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    HospitalAdmin,
    Staff,
    Patient,
    System,
}

impl Role {
    /// Convert to string for CSV storage
    pub fn to_string(&self) -> String {
        match self {
            Role::SuperAdmin => "super-admin".to_string(),
            Role::HospitalAdmin => "hospital-admin".to_string(),
            Role::Staff => "staff".to_string(),
            Role::Patient => "patient".to_string(),
            Role::System => "system".to_string(),
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "hospital-admin" => Ok(Role::HospitalAdmin),
            "staff" => Ok(Role::Staff),
            "patient" => Ok(Role::Patient),
            "system" => Ok(Role::System),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Well-known actor id for scheduler-driven writes.
pub const SYSTEM_ACTOR_ID: &str = "system";

/// Well-known actor id for caught batch failures.
pub const SYSTEM_ERROR_ACTOR_ID: &str = "system_error";

/// Fallback `created_by` identity for generated records when the patient
/// has no user account reference.
pub const SYSTEM_USER_ID: &str = "user::system";

/// One entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub actor_id: String,
    pub actor_role: Role,
    pub description: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Generate a unique ID for a log entry
    pub fn generate_id(timestamp_nanos: i64) -> String {
        format!("log::{}", timestamp_nanos)
    }
}
