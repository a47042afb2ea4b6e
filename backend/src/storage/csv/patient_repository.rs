//! CSV-backed patient repository. All patients live in one
//! `patients.csv` file under the data directory; writes rewrite the file
//! through a temp file so readers never observe a half-written state.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::patient::{Patient, PregnancyStatus};
use crate::storage::traits::PatientStorage;

const PATIENTS_FILE: &str = "patients.csv";
const HEADER: &str = "id,user_id,hospital_id,full_name,phone_number,language_preference,pregnancy_status,lmp,edd,registered_by,created_at,updated_at";

/// CSV record structure for patients
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatientRecord {
    id: String,
    user_id: String,
    hospital_id: String,
    full_name: String,
    phone_number: String,
    language_preference: String,
    pregnancy_status: String,
    lmp: String,
    edd: String,
    registered_by: String,
    created_at: String,
    updated_at: String,
}

impl From<Patient> for PatientRecord {
    fn from(patient: Patient) -> Self {
        PatientRecord {
            id: patient.id,
            user_id: patient.user_id.unwrap_or_default(),
            hospital_id: patient.hospital_id,
            full_name: patient.full_name,
            phone_number: patient.phone_number,
            language_preference: patient.language_preference,
            pregnancy_status: patient.pregnancy_status.to_string(),
            lmp: patient.lmp.to_string(),
            edd: patient.edd.map(|d| d.to_string()).unwrap_or_default(),
            registered_by: patient.registered_by,
            created_at: patient.created_at.to_rfc3339(),
            updated_at: patient.updated_at.to_rfc3339(),
        }
    }
}

impl TryFrom<PatientRecord> for Patient {
    type Error = anyhow::Error;

    fn try_from(record: PatientRecord) -> Result<Self> {
        let pregnancy_status = PregnancyStatus::from_string(&record.pregnancy_status)
            .map_err(|e| anyhow::anyhow!("Failed to parse pregnancy status: {}", e))?;
        let lmp = NaiveDate::parse_from_str(&record.lmp, "%Y-%m-%d")
            .with_context(|| format!("Invalid lmp date in record {}", record.id))?;
        let edd = if record.edd.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(&record.edd, "%Y-%m-%d")
                    .with_context(|| format!("Invalid edd date in record {}", record.id))?,
            )
        };

        Ok(Patient {
            id: record.id.clone(),
            user_id: if record.user_id.is_empty() {
                None
            } else {
                Some(record.user_id)
            },
            hospital_id: record.hospital_id,
            full_name: record.full_name,
            phone_number: record.phone_number,
            language_preference: record.language_preference,
            pregnancy_status,
            lmp,
            edd,
            registered_by: record.registered_by,
            created_at: parse_timestamp(&record.created_at, &record.id)?,
            updated_at: parse_timestamp(&record.updated_at, &record.id)?,
        })
    }
}

fn parse_timestamp(value: &str, record_id: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in record {}", record_id))
}

/// CSV-based patient repository
#[derive(Clone)]
pub struct PatientRepository {
    connection: CsvConnection,
}

impl PatientRepository {
    /// Create a new CSV patient repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<Patient>> {
        let path = self.connection.ensure_file(PATIENTS_FILE, HEADER)?;
        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut patients = Vec::new();
        for result in reader.deserialize::<PatientRecord>() {
            let record = result.context("Failed to parse patient record")?;
            patients.push(Patient::try_from(record)?);
        }
        Ok(patients)
    }

    fn save_all(&self, patients: &[Patient]) -> Result<()> {
        let path = self.connection.file_path(PATIENTS_FILE);
        let tmp_path = self.connection.file_path(&format!("{}.tmp", PATIENTS_FILE));

        {
            let mut writer = Writer::from_path(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            for patient in patients {
                writer.serialize(PatientRecord::from(patient.clone()))?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &path).context("Failed to replace patients file")?;
        Ok(())
    }
}

impl PatientStorage for PatientRepository {
    fn store_patient(&self, patient: &Patient) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let mut patients = self.load_all()?;
        if patients.iter().any(|p| p.id == patient.id) {
            return Err(anyhow::anyhow!("Patient already exists: {}", patient.id));
        }
        patients.push(patient.clone());
        self.save_all(&patients)
    }

    fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>> {
        Ok(self.load_all()?.into_iter().find(|p| p.id == patient_id))
    }

    fn list_patients(&self) -> Result<Vec<Patient>> {
        let mut patients = self.load_all()?;
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(patients)
    }

    fn update_patient(&self, patient: &Patient) -> Result<()> {
        let _guard = self.connection.lock_for_write();
        let mut patients = self.load_all()?;
        let slot = patients
            .iter_mut()
            .find(|p| p.id == patient.id)
            .ok_or_else(|| anyhow::anyhow!("Patient not found: {}", patient.id))?;
        *slot = patient.clone();
        self.save_all(&patients)
    }

    fn delete_patient(&self, patient_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_for_write();
        let mut patients = self.load_all()?;
        let before = patients.len();
        patients.retain(|p| p.id != patient_id);
        if patients.len() == before {
            return Ok(false);
        }
        self.save_all(&patients)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (PatientRepository, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        (PatientRepository::new(conn), temp_dir)
    }

    fn sample_patient(id: &str, name: &str) -> Patient {
        let now = Utc::now();
        Patient {
            id: id.to_string(),
            user_id: None,
            hospital_id: "hospital::1".to_string(),
            full_name: name.to_string(),
            phone_number: "+254700000001".to_string(),
            language_preference: "English".to_string(),
            pregnancy_status: PregnancyStatus::First,
            lmp: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            edd: Some(NaiveDate::from_ymd_opt(2024, 10, 17).unwrap()),
            registered_by: "user::staff1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_and_get_round_trip() {
        let (repo, _dir) = setup();
        let patient = sample_patient("patient::1", "Jane Doe");

        repo.store_patient(&patient).unwrap();
        let loaded = repo.get_patient("patient::1").unwrap().unwrap();

        assert_eq!(loaded.full_name, "Jane Doe");
        assert_eq!(loaded.lmp, patient.lmp);
        assert_eq!(loaded.edd, patient.edd);
        assert_eq!(loaded.pregnancy_status, PregnancyStatus::First);
    }

    #[test]
    fn test_optional_fields_survive_storage() {
        let (repo, _dir) = setup();
        let mut patient = sample_patient("patient::2", "Amina Otieno");
        patient.user_id = Some("user::42".to_string());
        patient.edd = None;

        repo.store_patient(&patient).unwrap();
        let loaded = repo.get_patient("patient::2").unwrap().unwrap();

        assert_eq!(loaded.user_id.as_deref(), Some("user::42"));
        assert!(loaded.edd.is_none());
    }

    #[test]
    fn test_duplicate_store_rejected() {
        let (repo, _dir) = setup();
        let patient = sample_patient("patient::3", "Jane Doe");
        repo.store_patient(&patient).unwrap();
        assert!(repo.store_patient(&patient).is_err());
    }

    #[test]
    fn test_list_ordered_by_name() {
        let (repo, _dir) = setup();
        repo.store_patient(&sample_patient("patient::b", "Beatrice")).unwrap();
        repo.store_patient(&sample_patient("patient::a", "Achieng")).unwrap();

        let names: Vec<String> = repo
            .list_patients()
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Achieng", "Beatrice"]);
    }

    #[test]
    fn test_update_and_delete() {
        let (repo, _dir) = setup();
        let mut patient = sample_patient("patient::4", "Jane Doe");
        repo.store_patient(&patient).unwrap();

        patient.phone_number = "+254711111111".to_string();
        repo.update_patient(&patient).unwrap();
        let loaded = repo.get_patient("patient::4").unwrap().unwrap();
        assert_eq!(loaded.phone_number, "+254711111111");

        assert!(repo.delete_patient("patient::4").unwrap());
        assert!(!repo.delete_patient("patient::4").unwrap());
        assert!(repo.get_patient("patient::4").unwrap().is_none());
    }
}
