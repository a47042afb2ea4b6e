//! Domain layer: synchronous services over the storage traits.

pub mod commands;
pub mod log_service;
pub mod models;
pub mod notifier;
pub mod patient_service;
pub mod pregnancy;
pub mod reminder_service;
pub mod tip_catalog;
pub mod tip_service;

pub use log_service::LogService;
pub use patient_service::PatientService;
pub use reminder_service::ReminderService;
pub use tip_service::TipService;
