use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::commands::tips::{CreateTipCommand, CreateTipResult};
use crate::domain::models::health_tip::{
    week_tag, HealthTip, TipValidationError, AUTO_GENERATED_TAG, WEEK_MAX, WEEK_MIN,
};
use crate::domain::models::log::{Role, SYSTEM_ACTOR_ID, SYSTEM_USER_ID};
use crate::domain::models::patient::Patient;
use crate::domain::log_service::LogService;
use crate::domain::pregnancy;
use crate::domain::tip_catalog;
use crate::storage::csv::{CsvConnection, HealthTipRepository, PatientRepository};
use crate::storage::traits::{HealthTipStorage, PatientStorage};

/// How many of the newest tips to return when a patient has no due date
/// to personalize against.
const FALLBACK_TIP_COUNT: usize = 5;

/// Service for health tips: staff-authored CRUD, week-based
/// personalization, and the daily generation pass.
#[derive(Clone)]
pub struct TipService {
    tip_repository: HealthTipRepository,
    patient_repository: PatientRepository,
    log_service: LogService,
}

impl TipService {
    /// Create a new TipService
    pub fn new(csv_conn: Arc<CsvConnection>, log_service: LogService) -> Self {
        let tip_repository = HealthTipRepository::new((*csv_conn).clone());
        let patient_repository = PatientRepository::new((*csv_conn).clone());
        Self {
            tip_repository,
            patient_repository,
            log_service,
        }
    }

    /// Create a staff-authored health tip
    pub fn create_tip(&self, command: CreateTipCommand) -> Result<CreateTipResult> {
        info!("Creating health tip: \"{}\"", command.title);

        self.validate_create_command(&command)?;

        let now = Utc::now();
        let tip = HealthTip {
            id: HealthTip::generate_id(now.timestamp_nanos_opt().unwrap_or_default()),
            title: command.title.trim().to_string(),
            content: command.content.trim().to_string(),
            relevant_week: command.relevant_week,
            tags: command.tags,
            created_by: command.created_by.clone(),
            created_at: now,
        };

        self.tip_repository.store_tip(&tip)?;

        self.log_service.log_activity(
            &command.created_by,
            Role::Staff,
            &format!("Created health tip: \"{}\"", tip.title),
            "HealthTip",
            Some(&tip.id),
        );

        Ok(CreateTipResult { tip })
    }

    /// Get a tip by ID
    pub fn get_tip(&self, tip_id: &str) -> Result<Option<HealthTip>> {
        self.tip_repository.get_tip(tip_id)
    }

    /// List all tips, newest first
    pub fn list_tips(&self) -> Result<Vec<HealthTip>> {
        self.tip_repository.list_tips()
    }

    /// Delete a tip
    pub fn delete_tip(&self, tip_id: &str, deleted_by: &str) -> Result<bool> {
        let deleted = self.tip_repository.delete_tip(tip_id)?;
        if deleted {
            self.log_service.log_activity(
                deleted_by,
                Role::Staff,
                "Deleted health tip",
                "HealthTip",
                Some(tip_id),
            );
        }
        Ok(deleted)
    }

    /// All tips targeting exactly the given gestational week.
    pub fn get_tips_by_week(&self, week: u32) -> Result<Vec<HealthTip>> {
        if !(WEEK_MIN..=WEEK_MAX).contains(&week) {
            return Err(TipValidationError::WeekOutOfRange(week).into());
        }
        self.tip_repository.tips_for_week(week)
    }

    /// Tips personalized to a patient's current gestational week.
    ///
    /// A patient without a record or without a due date gets the newest
    /// tips as a general fallback; otherwise the current week plus its
    /// neighbors, ordered week-descending then newest-first.
    pub fn get_personalized_tips(&self, patient_id: &str) -> Result<Vec<HealthTip>> {
        let edd = self
            .patient_repository
            .get_patient(patient_id)?
            .and_then(|p| p.edd);

        let edd = match edd {
            Some(edd) => edd,
            None => {
                info!(
                    "No due date for patient {}, returning general tips",
                    patient_id
                );
                return self.tip_repository.latest_tips(FALLBACK_TIP_COUNT);
            }
        };

        let today = Utc::now().date_naive();
        let current_week = pregnancy::gestational_week(edd, today);
        let weeks: Vec<u32> = [
            current_week.saturating_sub(1),
            current_week,
            current_week + 1,
        ]
        .into_iter()
        .filter(|w| (WEEK_MIN..=WEEK_MAX).contains(w))
        .collect();

        info!(
            "Personalizing tips for patient {} at week {}",
            patient_id, current_week
        );
        self.tip_repository.tips_for_weeks(&weeks)
    }

    /// One daily generation pass: make sure every patient's current week
    /// has a tip created today.
    ///
    /// Dedup is global on (week, day), not per patient; tips are shared.
    /// A bad patient record is logged and skipped so it cannot abort the
    /// rest of the batch. Returns the number of tips generated.
    pub fn generate_daily_tips(&self, today: NaiveDate) -> Result<usize> {
        info!("Generating personalized health tips");

        let patients = self.patient_repository.list_patients()?;
        let mut generated = 0;
        for patient in &patients {
            match self.generate_tip_for_patient(patient, today) {
                Ok(true) => generated += 1,
                Ok(false) => {}
                Err(err) => {
                    error!(
                        "Tip generation failed for patient {}: {:#}",
                        patient.id, err
                    );
                }
            }
        }

        info!("Generated {} new health tips", generated);
        Ok(generated)
    }

    fn generate_tip_for_patient(&self, patient: &Patient, today: NaiveDate) -> Result<bool> {
        let edd = match patient.edd {
            Some(edd) => edd,
            None => return Ok(false),
        };

        let week = pregnancy::gestational_week(edd, today);
        if self.tip_repository.week_tip_exists_on(week, today)? {
            return Ok(false);
        }

        let template = tip_catalog::lookup(week as i64);
        let created_by = patient
            .user_id
            .clone()
            .unwrap_or_else(|| SYSTEM_USER_ID.to_string());

        let now = Utc::now();
        let tip = HealthTip {
            id: HealthTip::generate_id(now.timestamp_nanos_opt().unwrap_or_default()),
            title: template.title.to_string(),
            content: template.content.to_string(),
            relevant_week: Some(week),
            tags: vec![AUTO_GENERATED_TAG.to_string(), week_tag(week)],
            created_by,
            created_at: now,
        };
        self.tip_repository.store_tip(&tip)?;

        self.log_service.log_activity(
            SYSTEM_ACTOR_ID,
            Role::System,
            &format!("Generated health tip for week {}: \"{}\"", week, tip.title),
            "HealthTip",
            Some(&tip.id),
        );
        Ok(true)
    }

    /// Scheduler entry point: run one generation pass, containing any
    /// failure.
    pub fn run_scheduled_pass(&self) {
        info!("Starting daily health tip generation");
        match self.generate_daily_tips(Utc::now().date_naive()) {
            Ok(count) => {
                if count == 0 {
                    warn!("Daily tip pass generated nothing new");
                }
            }
            Err(err) => {
                error!("Tip generation pass error: {:#}", err);
                self.log_service
                    .log_system_error(&format!("Failed to generate tips: {}", err));
            }
        }
    }

    fn validate_create_command(&self, command: &CreateTipCommand) -> Result<()> {
        if command.title.trim().is_empty() {
            return Err(TipValidationError::EmptyTitle.into());
        }
        if command.title.len() > HealthTip::MAX_TITLE_LEN {
            return Err(TipValidationError::TitleTooLong.into());
        }
        if command.content.trim().is_empty() {
            return Err(TipValidationError::EmptyContent.into());
        }
        if command.content.len() > HealthTip::MAX_CONTENT_LEN {
            return Err(TipValidationError::ContentTooLong.into());
        }
        if let Some(week) = command.relevant_week {
            if !(WEEK_MIN..=WEEK_MAX).contains(&week) {
                return Err(TipValidationError::WeekOutOfRange(week).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::patients::CreatePatientCommand;
    use crate::domain::patient_service::PatientService;
    use chrono::{Days, Duration, Months};
    use tempfile::tempdir;

    struct Fixture {
        tip_service: TipService,
        patient_service: PatientService,
        _dir: tempfile::TempDir,
    }

    fn setup() -> Fixture {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let log_service = LogService::new(conn.clone());
        let tip_service = TipService::new(conn.clone(), log_service.clone());
        let patient_service = PatientService::new(conn, log_service);
        Fixture {
            tip_service,
            patient_service,
            _dir: temp_dir,
        }
    }

    fn tip_command(title: &str, week: Option<u32>) -> CreateTipCommand {
        CreateTipCommand {
            title: title.to_string(),
            content: "Eat well and rest.".to_string(),
            relevant_week: week,
            tags: vec!["nutrition".to_string()],
            created_by: "user::staff1".to_string(),
        }
    }

    /// Register a patient whose gestational week is `week` today.
    fn register_patient_at_week(fixture: &Fixture, week: u32) -> String {
        // EDD = today + (40 - week) * 7 days puts the patient exactly at
        // `week`; invert Naegele's rule step by step to get the LMP the
        // service will derive that EDD from. Month clamping can lose up
        // to three days, which never moves the resulting week.
        let today = Utc::now().date_naive();
        let edd = today + Duration::days((40 - week as i64) * 7);
        let lmp = edd
            .checked_sub_months(Months::new(12))
            .unwrap()
            .checked_add_months(Months::new(3))
            .unwrap()
            .checked_sub_days(Days::new(7))
            .unwrap();
        let result = fixture
            .patient_service
            .create_patient(CreatePatientCommand {
                user_id: Some("user::patient1".to_string()),
                hospital_id: "hospital::1".to_string(),
                full_name: "Jane Doe".to_string(),
                phone_number: "+254700000001".to_string(),
                language_preference: None,
                pregnancy_status: "First pregnancy".to_string(),
                lmp: lmp.to_string(),
                registered_by: "user::staff1".to_string(),
            })
            .unwrap();
        result.patient.id
    }

    #[test]
    fn test_get_tips_by_week_bounds() {
        let fixture = setup();
        assert!(fixture.tip_service.get_tips_by_week(0).is_err());
        assert!(fixture.tip_service.get_tips_by_week(43).is_err());
        assert!(fixture.tip_service.get_tips_by_week(1).unwrap().is_empty());
        assert!(fixture.tip_service.get_tips_by_week(42).unwrap().is_empty());
    }

    #[test]
    fn test_create_tip_validations() {
        let fixture = setup();
        assert!(fixture.tip_service.create_tip(tip_command("", Some(10))).is_err());
        assert!(fixture
            .tip_service
            .create_tip(tip_command(&"t".repeat(101), Some(10)))
            .is_err());
        assert!(fixture.tip_service.create_tip(tip_command("Ok", Some(0))).is_err());
        assert!(fixture.tip_service.create_tip(tip_command("Ok", Some(43))).is_err());
        assert!(fixture.tip_service.create_tip(tip_command("Ok", Some(42))).is_ok());
    }

    #[test]
    fn test_personalized_window_at_week_20() {
        let fixture = setup();
        let patient_id = register_patient_at_week(&fixture, 20);

        for (title, week) in [
            ("w18", 18u32),
            ("w19", 19),
            ("w20", 20),
            ("w21", 21),
            ("w22", 22),
        ] {
            fixture
                .tip_service
                .create_tip(tip_command(title, Some(week)))
                .unwrap();
        }

        let tips = fixture.tip_service.get_personalized_tips(&patient_id).unwrap();
        let weeks: Vec<u32> = tips.iter().filter_map(|t| t.relevant_week).collect();
        assert_eq!(weeks, vec![21, 20, 19]);
    }

    #[test]
    fn test_personalized_fallback_without_patient_record() {
        let fixture = setup();
        for i in 0..7 {
            let mut command = tip_command(&format!("tip-{}", i), Some(30));
            command.content = format!("Content {}", i);
            fixture.tip_service.create_tip(command).unwrap();
        }

        let tips = fixture
            .tip_service
            .get_personalized_tips("patient::missing")
            .unwrap();
        assert_eq!(tips.len(), 5);
    }

    #[test]
    fn test_generate_daily_tips_dedups_same_day() {
        let fixture = setup();
        register_patient_at_week(&fixture, 20);
        let today = Utc::now().date_naive();

        let first = fixture.tip_service.generate_daily_tips(today).unwrap();
        assert_eq!(first, 1);

        let second = fixture.tip_service.generate_daily_tips(today).unwrap();
        assert_eq!(second, 0, "same (week, day) must not generate twice");

        let tips = fixture.tip_service.get_tips_by_week(20).unwrap();
        assert_eq!(tips.len(), 1);
        assert!(tips[0].is_auto_generated());
        assert!(tips[0].tags.contains(&"week-20".to_string()));
        assert_eq!(tips[0].created_by, "user::patient1");
    }

    #[test]
    fn test_generate_daily_tips_shares_across_patients_at_same_week() {
        let fixture = setup();
        register_patient_at_week(&fixture, 20);
        register_patient_at_week(&fixture, 20);
        register_patient_at_week(&fixture, 31);
        let today = Utc::now().date_naive();

        let generated = fixture.tip_service.generate_daily_tips(today).unwrap();
        // One tip per distinct week, not per patient
        assert_eq!(generated, 2);
    }

    #[test]
    fn test_generate_uses_catalog_template() {
        let fixture = setup();
        register_patient_at_week(&fixture, 20);
        let today = Utc::now().date_naive();

        fixture.tip_service.generate_daily_tips(today).unwrap();
        let tips = fixture.tip_service.get_tips_by_week(20).unwrap();
        assert_eq!(tips[0].title, "Halfway Point Celebration");
    }

    #[test]
    fn test_generate_falls_back_to_system_identity() {
        let fixture = setup();
        let patient_id = register_patient_at_week(&fixture, 12);
        // Strip the user reference to force the sentinel attribution
        let mut patient = fixture
            .patient_service
            .get_patient(&patient_id)
            .unwrap()
            .unwrap();
        patient.user_id = None;
        // Write the stripped record straight through the repository
        let conn = Arc::new(CsvConnection::new(fixture._dir.path()).unwrap());
        PatientRepository::new((*conn).clone())
            .update_patient(&patient)
            .unwrap();

        let today = Utc::now().date_naive();
        fixture.tip_service.generate_daily_tips(today).unwrap();

        let tips = fixture.tip_service.get_tips_by_week(12).unwrap();
        assert_eq!(tips[0].created_by, SYSTEM_USER_ID);
    }
}
