use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::patients::{
    CreatePatientCommand, CreatePatientResult, DeletePatientResult, UpdatePatientCommand,
    UpdatePatientResult,
};
use crate::domain::models::log::Role;
use crate::domain::models::patient::{Patient, PatientValidationError, PregnancyStatus};
use crate::domain::models::NotFound;
use crate::domain::log_service::LogService;
use crate::domain::pregnancy;
use crate::storage::csv::{CsvConnection, PatientRepository};
use crate::storage::traits::PatientStorage;

/// Service for managing patient records.
///
/// Owns the pregnancy-dating invariant: `edd` is recomputed from `lmp`
/// on registration and on every update that changes `lmp`, and is never
/// accepted from clients.
#[derive(Clone)]
pub struct PatientService {
    patient_repository: PatientRepository,
    log_service: LogService,
}

impl PatientService {
    /// Create a new PatientService
    pub fn new(csv_conn: Arc<CsvConnection>, log_service: LogService) -> Self {
        let patient_repository = PatientRepository::new((*csv_conn).clone());
        Self {
            patient_repository,
            log_service,
        }
    }

    /// Register a new patient
    pub fn create_patient(&self, command: CreatePatientCommand) -> Result<CreatePatientResult> {
        info!(
            "Registering patient: name={}, hospital={}",
            command.full_name, command.hospital_id
        );

        self.validate_create_command(&command)?;

        let pregnancy_status = PregnancyStatus::from_string(&command.pregnancy_status)
            .map_err(|e| anyhow::anyhow!(e))?;
        let lmp = pregnancy::parse_date(&command.lmp)?;
        let edd = pregnancy::compute_edd(lmp)?;

        let now = Utc::now();
        let patient = Patient {
            id: Patient::generate_id(now.timestamp_nanos_opt().unwrap_or_default()),
            user_id: command.user_id,
            hospital_id: command.hospital_id,
            full_name: command.full_name.trim().to_string(),
            phone_number: command.phone_number.trim().to_string(),
            language_preference: command
                .language_preference
                .unwrap_or_else(|| "English".to_string()),
            pregnancy_status,
            lmp,
            edd: Some(edd),
            registered_by: command.registered_by.clone(),
            created_at: now,
            updated_at: now,
        };

        self.patient_repository.store_patient(&patient)?;

        info!(
            "Registered patient {} (LMP {}, EDD {})",
            patient.id, patient.lmp, edd
        );
        self.log_service.log_activity(
            &command.registered_by,
            Role::Staff,
            &format!("Registered patient {}", patient.full_name),
            "Patient",
            Some(&patient.id),
        );

        Ok(CreatePatientResult { patient })
    }

    /// Get a patient by ID
    pub fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>> {
        let patient = self.patient_repository.get_patient(patient_id)?;
        if patient.is_none() {
            warn!("Patient not found: {}", patient_id);
        }
        Ok(patient)
    }

    /// List all patients
    pub fn list_patients(&self) -> Result<Vec<Patient>> {
        self.patient_repository.list_patients()
    }

    /// Update an existing patient. Changing `lmp` recomputes `edd`.
    pub fn update_patient(&self, command: UpdatePatientCommand) -> Result<UpdatePatientResult> {
        info!("Updating patient: {}", command.patient_id);

        let mut patient = self
            .patient_repository
            .get_patient(&command.patient_id)?
            .ok_or_else(|| NotFound("Patient", command.patient_id.clone()))?;

        if let Some(full_name) = command.full_name {
            if full_name.trim().is_empty() {
                return Err(PatientValidationError::EmptyName.into());
            }
            patient.full_name = full_name.trim().to_string();
        }
        if let Some(phone_number) = command.phone_number {
            patient.phone_number = phone_number.trim().to_string();
        }
        if let Some(language_preference) = command.language_preference {
            patient.language_preference = language_preference;
        }
        if let Some(lmp_str) = command.lmp {
            let lmp = pregnancy::parse_date(&lmp_str)?;
            if lmp != patient.lmp {
                let edd = pregnancy::compute_edd(lmp)?;
                info!(
                    "LMP changed for {}: {} -> {}, EDD recomputed to {}",
                    patient.id, patient.lmp, lmp, edd
                );
                patient.lmp = lmp;
                patient.edd = Some(edd);
            }
        }

        patient.updated_at = Utc::now();
        self.patient_repository.update_patient(&patient)?;

        self.log_service.log_activity(
            &command.updated_by,
            Role::Staff,
            &format!("Updated patient {}", patient.full_name),
            "Patient",
            Some(&patient.id),
        );

        Ok(UpdatePatientResult { patient })
    }

    /// Delete a patient record
    pub fn delete_patient(&self, patient_id: &str, deleted_by: &str) -> Result<DeletePatientResult> {
        info!("Deleting patient: {}", patient_id);

        let patient = self
            .patient_repository
            .get_patient(patient_id)?
            .ok_or_else(|| NotFound("Patient", patient_id.to_string()))?;

        self.patient_repository.delete_patient(patient_id)?;

        self.log_service.log_activity(
            deleted_by,
            Role::Staff,
            &format!("Deleted patient {}", patient.full_name),
            "Patient",
            Some(patient_id),
        );

        Ok(DeletePatientResult {
            success_message: format!("Patient '{}' deleted successfully", patient.full_name),
        })
    }

    fn validate_create_command(&self, command: &CreatePatientCommand) -> Result<()> {
        if command.full_name.trim().is_empty() {
            return Err(PatientValidationError::EmptyName.into());
        }
        if command.full_name.len() > 100 {
            return Err(PatientValidationError::NameTooLong.into());
        }
        if command.hospital_id.trim().is_empty() {
            return Err(PatientValidationError::EmptyHospital.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn setup() -> (PatientService, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let log_service = LogService::new(conn.clone());
        (PatientService::new(conn, log_service), temp_dir)
    }

    fn create_command(lmp: &str) -> CreatePatientCommand {
        CreatePatientCommand {
            user_id: None,
            hospital_id: "hospital::1".to_string(),
            full_name: "Jane Doe".to_string(),
            phone_number: "+254700000001".to_string(),
            language_preference: None,
            pregnancy_status: "First pregnancy".to_string(),
            lmp: lmp.to_string(),
            registered_by: "user::staff1".to_string(),
        }
    }

    #[test]
    fn test_create_patient_derives_edd() {
        let (service, _dir) = setup();
        let result = service.create_patient(create_command("2024-01-10")).unwrap();

        assert_eq!(
            result.patient.edd,
            Some(NaiveDate::from_ymd_opt(2024, 10, 17).unwrap())
        );
        assert_eq!(result.patient.language_preference, "English");
    }

    #[test]
    fn test_create_patient_invalid_lmp_rejected() {
        let (service, _dir) = setup();
        let result = service.create_patient(create_command("not-a-date"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .downcast_ref::<pregnancy::DatingError>()
            .is_some());
    }

    #[test]
    fn test_create_patient_empty_name_rejected() {
        let (service, _dir) = setup();
        let mut command = create_command("2024-01-10");
        command.full_name = "  ".to_string();
        assert!(service.create_patient(command).is_err());
    }

    #[test]
    fn test_update_lmp_recomputes_edd() {
        let (service, _dir) = setup();
        let created = service.create_patient(create_command("2024-01-10")).unwrap();

        let updated = service
            .update_patient(UpdatePatientCommand {
                patient_id: created.patient.id.clone(),
                lmp: Some("2024-02-01".to_string()),
                updated_by: "user::staff1".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            updated.patient.lmp,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        // 2024-02-01 + 7d = 2024-02-08; -3 months = 2023-11-08; +1 year
        assert_eq!(
            updated.patient.edd,
            Some(NaiveDate::from_ymd_opt(2024, 11, 8).unwrap())
        );
    }

    #[test]
    fn test_update_without_lmp_keeps_edd() {
        let (service, _dir) = setup();
        let created = service.create_patient(create_command("2024-01-10")).unwrap();

        let updated = service
            .update_patient(UpdatePatientCommand {
                patient_id: created.patient.id.clone(),
                phone_number: Some("+254711111111".to_string()),
                updated_by: "user::staff1".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.patient.edd, created.patient.edd);
        assert_eq!(updated.patient.phone_number, "+254711111111");
    }

    #[test]
    fn test_update_missing_patient_is_not_found() {
        let (service, _dir) = setup();
        let result = service.update_patient(UpdatePatientCommand {
            patient_id: "patient::missing".to_string(),
            updated_by: "user::staff1".to_string(),
            ..Default::default()
        });
        assert!(result.unwrap_err().downcast_ref::<NotFound>().is_some());
    }

    #[test]
    fn test_delete_patient() {
        let (service, _dir) = setup();
        let created = service.create_patient(create_command("2024-01-10")).unwrap();

        let deleted = service
            .delete_patient(&created.patient.id, "user::staff1")
            .unwrap();
        assert!(deleted.success_message.contains("Jane Doe"));
        assert!(service.get_patient(&created.patient.id).unwrap().is_none());
    }
}
