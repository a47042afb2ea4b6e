use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::Arc;

use crate::domain::commands::reminders::{
    CreateReminderCommand, CreateReminderResult, DispatchSummary, UpdateReminderCommand,
    UpdateReminderResult,
};
use crate::domain::models::log::{Role, SYSTEM_ACTOR_ID};
use crate::domain::models::reminder::{Reminder, ReminderType, ReminderValidationError};
use crate::domain::models::NotFound;
use crate::domain::log_service::LogService;
use crate::domain::notifier::{Notifier, SENDER_NAME};
use crate::storage::csv::{CsvConnection, PatientRepository, ReminderRepository};
use crate::storage::traits::{PatientStorage, ReminderStorage};

/// Service for scheduling reminders and dispatching the due ones.
///
/// Delivery is at-least-once: a reminder is marked sent only after the
/// provider accepts it, so a send that succeeds right before a failed
/// write can be delivered again on the next pass. There is no
/// cross-instance claim step; running several dispatchers against the
/// same store can double-send.
#[derive(Clone)]
pub struct ReminderService {
    reminder_repository: ReminderRepository,
    patient_repository: PatientRepository,
    log_service: LogService,
    notifier: Arc<dyn Notifier>,
}

impl ReminderService {
    /// Create a new ReminderService
    pub fn new(
        csv_conn: Arc<CsvConnection>,
        notifier: Arc<dyn Notifier>,
        log_service: LogService,
    ) -> Self {
        let reminder_repository = ReminderRepository::new((*csv_conn).clone());
        let patient_repository = PatientRepository::new((*csv_conn).clone());
        Self {
            reminder_repository,
            patient_repository,
            log_service,
            notifier,
        }
    }

    /// Schedule a new reminder
    pub fn create_reminder(&self, command: CreateReminderCommand) -> Result<CreateReminderResult> {
        info!(
            "Creating {} reminder for patient {}",
            command.reminder_type, command.patient_id
        );

        let reminder_type = ReminderType::from_string(&command.reminder_type)
            .map_err(|_| ReminderValidationError::UnknownType(command.reminder_type.clone()))?;
        if command.message.trim().is_empty() {
            return Err(ReminderValidationError::EmptyMessage.into());
        }
        if command.message.len() > Reminder::MAX_MESSAGE_LEN {
            return Err(ReminderValidationError::MessageTooLong.into());
        }
        let scheduled_time = DateTime::parse_from_rfc3339(&command.scheduled_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                ReminderValidationError::InvalidScheduledTime(command.scheduled_time.clone())
            })?;

        if self
            .patient_repository
            .get_patient(&command.patient_id)?
            .is_none()
        {
            return Err(NotFound("Patient", command.patient_id.clone()).into());
        }

        let now = Utc::now();
        let reminder = Reminder {
            id: Reminder::generate_id(now.timestamp_nanos_opt().unwrap_or_default()),
            patient_id: command.patient_id,
            hospital_id: command.hospital_id,
            reminder_type,
            message: command.message.trim().to_string(),
            scheduled_time,
            sent: false,
            sent_at: None,
            created_by: command.created_by.clone(),
            created_at: now,
        };

        self.reminder_repository.store_reminder(&reminder)?;

        self.log_service.log_activity(
            &command.created_by,
            Role::Staff,
            &format!("Scheduled reminder for {}", reminder.scheduled_time),
            "Reminder",
            Some(&reminder.id),
        );

        Ok(CreateReminderResult { reminder })
    }

    /// Get a reminder by ID
    pub fn get_reminder(&self, reminder_id: &str) -> Result<Option<Reminder>> {
        self.reminder_repository.get_reminder(reminder_id)
    }

    /// List all reminders
    pub fn list_reminders(&self) -> Result<Vec<Reminder>> {
        self.reminder_repository.list_reminders()
    }

    /// List reminders for one patient
    pub fn list_reminders_for_patient(&self, patient_id: &str) -> Result<Vec<Reminder>> {
        self.reminder_repository.list_reminders_for_patient(patient_id)
    }

    /// Reschedule or reword a reminder. Only unsent reminders can
    /// change; a dispatched reminder is history, not a draft.
    pub fn update_reminder(&self, command: UpdateReminderCommand) -> Result<UpdateReminderResult> {
        info!("Updating reminder: {}", command.reminder_id);

        let mut reminder = self
            .reminder_repository
            .get_reminder(&command.reminder_id)?
            .ok_or_else(|| NotFound("Reminder", command.reminder_id.clone()))?;

        if reminder.sent {
            return Err(ReminderValidationError::AlreadySent.into());
        }

        if let Some(message) = command.message {
            if message.trim().is_empty() {
                return Err(ReminderValidationError::EmptyMessage.into());
            }
            if message.len() > Reminder::MAX_MESSAGE_LEN {
                return Err(ReminderValidationError::MessageTooLong.into());
            }
            reminder.message = message.trim().to_string();
        }
        if let Some(scheduled_time) = command.scheduled_time {
            reminder.scheduled_time = DateTime::parse_from_rfc3339(&scheduled_time)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ReminderValidationError::InvalidScheduledTime(scheduled_time))?;
        }

        self.reminder_repository.update_reminder(&reminder)?;

        self.log_service.log_activity(
            &command.updated_by,
            Role::Staff,
            &format!("Updated reminder {}", reminder.id),
            "Reminder",
            Some(&reminder.id),
        );

        Ok(UpdateReminderResult { reminder })
    }

    /// Delete a reminder
    pub fn delete_reminder(&self, reminder_id: &str) -> Result<bool> {
        self.reminder_repository.delete_reminder(reminder_id)
    }

    /// One dispatch pass over all due, unsent reminders.
    ///
    /// A reminder whose patient is gone or has no phone number is
    /// skipped without being marked sent; a provider failure leaves the
    /// reminder unsent for the next pass. Every attempt lands in the
    /// audit trail.
    pub fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchSummary> {
        let due = self.reminder_repository.due_unsent(now)?;
        info!("Found {} due reminders", due.len());

        let mut summary = DispatchSummary::default();
        for mut reminder in due {
            let patient = match self.patient_repository.get_patient(&reminder.patient_id)? {
                Some(patient) => patient,
                None => {
                    warn!(
                        "Skipping reminder {}: patient {} no longer exists",
                        reminder.id, reminder.patient_id
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if patient.phone_number.trim().is_empty() {
                warn!(
                    "Skipping reminder {}: patient {} has no phone number",
                    reminder.id, patient.id
                );
                summary.skipped += 1;
                continue;
            }

            info!(
                "Sending reminder to {}: {}",
                patient.full_name, reminder.message
            );
            let text = format!(
                "{} Reminder for {}: {}",
                SENDER_NAME, patient.full_name, reminder.message
            );
            let result = self.notifier.send_sms(&patient.phone_number, &text);

            if result.success {
                reminder.sent = true;
                reminder.sent_at = Some(now);
                self.reminder_repository.update_reminder(&reminder)?;
                summary.sent += 1;

                self.log_service.log_activity(
                    &reminder.created_by,
                    Role::System,
                    &format!("Sent reminder to {}", patient.full_name),
                    "Reminder",
                    Some(&reminder.id),
                );
            } else {
                summary.failed += 1;
                let reason = result.error.unwrap_or_else(|| result.message.clone());
                warn!(
                    "Reminder {} delivery failed, will retry next pass: {}",
                    reminder.id, reason
                );
                self.log_service.log_activity(
                    SYSTEM_ACTOR_ID,
                    Role::System,
                    &format!("Reminder delivery to {} failed: {}", patient.full_name, reason),
                    "Reminder",
                    Some(&reminder.id),
                );
            }
        }

        Ok(summary)
    }

    /// Scheduler entry point: run one pass, containing any failure.
    pub fn run_scheduled_pass(&self) {
        info!("Running scheduled reminder check");
        match self.dispatch_due(Utc::now()) {
            Ok(summary) => info!(
                "Reminder pass complete: {} sent, {} skipped, {} failed",
                summary.sent, summary.skipped, summary.failed
            ),
            Err(err) => {
                error!("Reminder pass error: {:#}", err);
                self.log_service
                    .log_system_error(&format!("Failed to send reminders: {}", err));
            }
        }
    }
}
