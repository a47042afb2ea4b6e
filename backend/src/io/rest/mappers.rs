//! Conversions between the `shared` DTOs and domain types.

use shared::{
    ActivityLogDto, CreateHealthTipRequest, CreatePatientRequest, CreateReminderRequest,
    HealthTipDto, PatientDto, ReminderDto, UpdatePatientRequest, UpdateReminderRequest,
};

use crate::domain::commands::patients::{CreatePatientCommand, UpdatePatientCommand};
use crate::domain::commands::reminders::{CreateReminderCommand, UpdateReminderCommand};
use crate::domain::commands::tips::CreateTipCommand;
use crate::domain::models::health_tip::HealthTip;
use crate::domain::models::log::ActivityLog;
use crate::domain::models::patient::Patient;
use crate::domain::models::reminder::Reminder;

pub fn patient_to_dto(patient: Patient) -> PatientDto {
    PatientDto {
        id: patient.id,
        user_id: patient.user_id,
        hospital_id: patient.hospital_id,
        full_name: patient.full_name,
        phone_number: patient.phone_number,
        language_preference: patient.language_preference,
        pregnancy_status: patient.pregnancy_status.to_string(),
        lmp: patient.lmp.to_string(),
        edd: patient.edd.map(|d| d.to_string()),
        registered_by: patient.registered_by,
        created_at: patient.created_at.to_rfc3339(),
        updated_at: patient.updated_at.to_rfc3339(),
    }
}

pub fn create_patient_command(request: CreatePatientRequest) -> CreatePatientCommand {
    CreatePatientCommand {
        user_id: request.user_id,
        hospital_id: request.hospital_id,
        full_name: request.full_name,
        phone_number: request.phone_number,
        language_preference: request.language_preference,
        pregnancy_status: request.pregnancy_status,
        lmp: request.lmp,
        registered_by: request.registered_by,
    }
}

pub fn update_patient_command(
    patient_id: String,
    updated_by: String,
    request: UpdatePatientRequest,
) -> UpdatePatientCommand {
    UpdatePatientCommand {
        patient_id,
        full_name: request.full_name,
        phone_number: request.phone_number,
        language_preference: request.language_preference,
        lmp: request.lmp,
        updated_by,
    }
}

pub fn reminder_to_dto(reminder: Reminder) -> ReminderDto {
    ReminderDto {
        id: reminder.id,
        patient_id: reminder.patient_id,
        hospital_id: reminder.hospital_id,
        reminder_type: reminder.reminder_type.to_string(),
        message: reminder.message,
        scheduled_time: reminder.scheduled_time.to_rfc3339(),
        sent: reminder.sent,
        sent_at: reminder.sent_at.map(|t| t.to_rfc3339()),
        created_by: reminder.created_by,
        created_at: reminder.created_at.to_rfc3339(),
    }
}

pub fn create_reminder_command(request: CreateReminderRequest) -> CreateReminderCommand {
    CreateReminderCommand {
        patient_id: request.patient_id,
        hospital_id: request.hospital_id,
        reminder_type: request.reminder_type,
        message: request.message,
        scheduled_time: request.scheduled_time,
        created_by: request.created_by,
    }
}

pub fn update_reminder_command(
    reminder_id: String,
    updated_by: String,
    request: UpdateReminderRequest,
) -> UpdateReminderCommand {
    UpdateReminderCommand {
        reminder_id,
        message: request.message,
        scheduled_time: request.scheduled_time,
        updated_by,
    }
}

pub fn tip_to_dto(tip: HealthTip) -> HealthTipDto {
    HealthTipDto {
        id: tip.id,
        title: tip.title,
        content: tip.content,
        relevant_week: tip.relevant_week,
        tags: tip.tags,
        created_by: tip.created_by,
        created_at: tip.created_at.to_rfc3339(),
    }
}

pub fn create_tip_command(request: CreateHealthTipRequest) -> CreateTipCommand {
    CreateTipCommand {
        title: request.title,
        content: request.content,
        relevant_week: request.relevant_week,
        tags: request.tags.unwrap_or_default(),
        created_by: request.created_by,
    }
}

pub fn log_to_dto(entry: ActivityLog) -> ActivityLogDto {
    ActivityLogDto {
        id: entry.id,
        actor_id: entry.actor_id,
        actor_role: entry.actor_role.to_string(),
        description: entry.description,
        resource_type: entry.resource_type,
        resource_id: entry.resource_id,
        created_at: entry.created_at.to_rfc3339(),
    }
}
