//! End-to-end flow over the assembled backend: register a patient,
//! schedule a reminder, run dispatch and tip-generation passes, and
//! read the personalized view back.

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use tempfile::tempdir;

use mhaas_backend::domain::commands::patients::CreatePatientCommand;
use mhaas_backend::domain::commands::reminders::CreateReminderCommand;
use mhaas_backend::domain::models::notification::NotificationResult;
use mhaas_backend::domain::notifier::Notifier;
use mhaas_backend::storage::CsvConnection;
use mhaas_backend::Backend;

#[derive(Default)]
struct CountingNotifier {
    sms: Mutex<Vec<(String, String)>>,
}

impl Notifier for CountingNotifier {
    fn send_email(&self, _to: &str, _subject: &str, _body: &str) -> NotificationResult {
        NotificationResult::ok("Email sent successfully")
    }

    fn send_sms(&self, to: &str, message: &str) -> NotificationResult {
        self.sms
            .lock()
            .unwrap()
            .push((to.to_string(), message.to_string()));
        NotificationResult::ok("SMS sent successfully")
    }
}

fn backend_fixture() -> (Backend, Arc<CountingNotifier>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let conn = Arc::new(CsvConnection::new(dir.path()).unwrap());
    let notifier = Arc::new(CountingNotifier::default());
    let backend = Backend::new(conn, notifier.clone());
    (backend, notifier, dir)
}

#[test]
fn full_reminder_and_tip_cycle() {
    let (backend, notifier, _dir) = backend_fixture();

    let patient = backend
        .patient_service
        .create_patient(CreatePatientCommand {
            user_id: Some("user::amina".to_string()),
            hospital_id: "hospital::nairobi-west".to_string(),
            full_name: "Amina Otieno".to_string(),
            phone_number: "+254700000042".to_string(),
            language_preference: Some("Kiswahili".to_string()),
            pregnancy_status: "Subsequent pregnancy".to_string(),
            lmp: "2024-01-10".to_string(),
            registered_by: "user::staff1".to_string(),
        })
        .unwrap()
        .patient;
    assert_eq!(patient.edd.unwrap().to_string(), "2024-10-17");

    let now = Utc::now();
    backend
        .reminder_service
        .create_reminder(CreateReminderCommand {
            patient_id: patient.id.clone(),
            hospital_id: patient.hospital_id.clone(),
            reminder_type: "Medication".to_string(),
            message: "Take your iron and folate supplements".to_string(),
            scheduled_time: (now - Duration::minutes(3)).to_rfc3339(),
            created_by: "user::staff1".to_string(),
        })
        .unwrap();

    // Two dispatch passes deliver exactly once
    backend.reminder_service.run_scheduled_pass();
    backend.reminder_service.run_scheduled_pass();
    assert_eq!(notifier.sms.lock().unwrap().len(), 1);

    // Two daily passes generate exactly one tip for the current week
    backend.tip_service.run_scheduled_pass();
    backend.tip_service.run_scheduled_pass();
    let today = Utc::now().date_naive();
    let week =
        mhaas_backend::domain::pregnancy::gestational_week(patient.edd.unwrap(), today);
    let tips = backend.tip_service.get_tips_by_week(week).unwrap();
    assert_eq!(tips.len(), 1);
    assert!(tips[0].is_auto_generated());

    // The generated tip shows up in the patient's personalized view
    let personalized = backend
        .tip_service
        .get_personalized_tips(&patient.id)
        .unwrap();
    assert!(personalized.iter().any(|t| t.id == tips[0].id));

    // Every step above left an audit trail
    let entries = backend.log_service.recent(20).unwrap();
    assert!(entries.iter().any(|e| e.resource_type == "Patient"));
    assert!(entries.iter().any(|e| e.resource_type == "Reminder"));
    assert!(entries.iter().any(|e| e.resource_type == "HealthTip"));
}
