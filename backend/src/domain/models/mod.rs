pub mod health_tip;
pub mod log;
pub mod notification;
pub mod patient;
pub mod reminder;

/// Lookup failure for a referenced resource, kept as its own type so the
/// REST layer can map it to a 404 instead of a generic server error.
#[derive(Debug, thiserror::Error)]
#[error("{0} not found: {1}")]
pub struct NotFound(pub &'static str, pub String);
