//! MHAAS backend: maternal-health clinic management service.
//!
//! The domain layer tracks patients with pregnancy dating (LMP-derived
//! due dates), schedules SMS reminders, and maintains week-targeted
//! health tips. Two background schedulers keep the system moving: a
//! reminder dispatcher every few minutes and a daily tip generation
//! pass. A thin REST layer exposes the services.

pub mod config;
pub mod domain;
pub mod io;
pub mod scheduler;
pub mod storage;

use std::sync::Arc;

use domain::notifier::Notifier;
use domain::{LogService, PatientService, ReminderService, TipService};
use storage::CsvConnection;

/// Main backend struct that orchestrates all services
pub struct Backend {
    pub patient_service: PatientService,
    pub reminder_service: ReminderService,
    pub tip_service: TipService,
    pub log_service: LogService,
}

impl Backend {
    /// Create a new backend instance with all services over a shared
    /// storage connection
    pub fn new(csv_conn: Arc<CsvConnection>, notifier: Arc<dyn Notifier>) -> Self {
        let log_service = LogService::new(csv_conn.clone());
        let patient_service = PatientService::new(csv_conn.clone(), log_service.clone());
        let reminder_service =
            ReminderService::new(csv_conn.clone(), notifier, log_service.clone());
        let tip_service = TipService::new(csv_conn, log_service.clone());

        Backend {
            patient_service,
            reminder_service,
            tip_service,
            log_service,
        }
    }
}
