//! File-based storage: one CSV file per collection under the data
//! directory, guarded by a shared write lock and replaced atomically.

pub mod connection;
pub mod health_tip_repository;
pub mod log_repository;
pub mod patient_repository;
pub mod reminder_repository;

pub use connection::CsvConnection;
pub use health_tip_repository::HealthTipRepository;
pub use log_repository::LogRepository;
pub use patient_repository::PatientRepository;
pub use reminder_repository::ReminderRepository;
