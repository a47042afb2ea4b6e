//! Thin REST surface over the domain services.
//!
//! Handlers map DTOs onto domain commands and back; validation lives in
//! the services. Domain validation failures map to 400, missing
//! resources to 404, anything else to 500.

pub mod mappers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::error;
use tower_http::cors::{Any, CorsLayer};

use shared::{
    ActivityLogDto, CreateHealthTipRequest, CreatePatientRequest, CreateReminderRequest, ErrorBody,
    HealthTipDto, ListResponse, PatientDto, ReminderDto, UpdatePatientRequest,
    UpdateReminderRequest,
};

use crate::domain::models::health_tip::TipValidationError;
use crate::domain::models::log::SYSTEM_ACTOR_ID;
use crate::domain::models::patient::PatientValidationError;
use crate::domain::models::reminder::ReminderValidationError;
use crate::domain::models::NotFound;
use crate::domain::pregnancy::DatingError;
use crate::Backend;

use self::mappers::{
    create_patient_command, create_reminder_command, create_tip_command, log_to_dto,
    patient_to_dto, reminder_to_dto, tip_to_dto, update_patient_command,
    update_reminder_command,
};

/// Build the application router.
pub fn router(backend: Arc<Backend>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/patients", post(create_patient).get(list_patients))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/reminders", post(create_reminder).get(list_reminders))
        .route(
            "/reminders/:id",
            get(get_reminder).put(update_reminder).delete(delete_reminder),
        )
        .route("/healthtips", post(create_tip).get(list_tips))
        .route("/healthtips/week/:week", get(tips_by_week))
        .route("/healthtips/personalized/:patient_id", get(personalized_tips))
        .route("/healthtips/:id", get(get_tip).delete(delete_tip))
        .route("/logs", get(recent_logs));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .with_state(backend)
}

/// Error wrapper translating domain failures into HTTP statuses.
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if is_validation_error(&self.0) {
            StatusCode::BAD_REQUEST
        } else if self.0.downcast_ref::<NotFound>().is_some() {
            StatusCode::NOT_FOUND
        } else {
            error!("Unhandled error in request: {:#}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn is_validation_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DatingError>().is_some()
        || err.downcast_ref::<TipValidationError>().is_some()
        || err.downcast_ref::<ReminderValidationError>().is_some()
        || err.downcast_ref::<PatientValidationError>().is_some()
}

/// Actor attributed to mutations that carry no explicit identity field.
fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(SYSTEM_ACTOR_ID)
        .to_string()
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// --- Patients ---

async fn create_patient(
    State(backend): State<Arc<Backend>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = backend
        .patient_service
        .create_patient(create_patient_command(request))
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(patient_to_dto(result.patient))))
}

async fn list_patients(
    State(backend): State<Arc<Backend>>,
) -> Result<Json<ListResponse<PatientDto>>, ApiError> {
    let patients = backend.patient_service.list_patients().map_err(ApiError)?;
    let data: Vec<PatientDto> = patients.into_iter().map(patient_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

async fn get_patient(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Result<Json<PatientDto>, ApiError> {
    let patient = backend
        .patient_service
        .get_patient(&id)
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(NotFound("Patient", id).into()))?;
    Ok(Json(patient_to_dto(patient)))
}

async fn update_patient(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<PatientDto>, ApiError> {
    let command = update_patient_command(id, actor_from(&headers), request);
    let result = backend
        .patient_service
        .update_patient(command)
        .map_err(ApiError)?;
    Ok(Json(patient_to_dto(result.patient)))
}

async fn delete_patient(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = backend
        .patient_service
        .delete_patient(&id, &actor_from(&headers))
        .map_err(ApiError)?;
    Ok(Json(serde_json::json!({ "message": result.success_message })))
}

// --- Reminders ---

async fn create_reminder(
    State(backend): State<Arc<Backend>>,
    Json(request): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = backend
        .reminder_service
        .create_reminder(create_reminder_command(request))
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(reminder_to_dto(result.reminder))))
}

async fn list_reminders(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<ReminderDto>>, ApiError> {
    let reminders = match params.get("patient_id") {
        Some(patient_id) => backend
            .reminder_service
            .list_reminders_for_patient(patient_id),
        None => backend.reminder_service.list_reminders(),
    }
    .map_err(ApiError)?;
    let data: Vec<ReminderDto> = reminders.into_iter().map(reminder_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

async fn get_reminder(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Result<Json<ReminderDto>, ApiError> {
    let reminder = backend
        .reminder_service
        .get_reminder(&id)
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(NotFound("Reminder", id).into()))?;
    Ok(Json(reminder_to_dto(reminder)))
}

async fn update_reminder(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateReminderRequest>,
) -> Result<Json<ReminderDto>, ApiError> {
    let command = update_reminder_command(id, actor_from(&headers), request);
    let result = backend
        .reminder_service
        .update_reminder(command)
        .map_err(ApiError)?;
    Ok(Json(reminder_to_dto(result.reminder)))
}

async fn delete_reminder(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = backend
        .reminder_service
        .delete_reminder(&id)
        .map_err(ApiError)?;
    if !deleted {
        return Err(ApiError(NotFound("Reminder", id).into()));
    }
    Ok(Json(serde_json::json!({ "message": "Reminder deleted" })))
}

// --- Health tips ---

async fn create_tip(
    State(backend): State<Arc<Backend>>,
    Json(request): Json<CreateHealthTipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = backend
        .tip_service
        .create_tip(create_tip_command(request))
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(tip_to_dto(result.tip))))
}

async fn list_tips(
    State(backend): State<Arc<Backend>>,
) -> Result<Json<ListResponse<HealthTipDto>>, ApiError> {
    let tips = backend.tip_service.list_tips().map_err(ApiError)?;
    let data: Vec<HealthTipDto> = tips.into_iter().map(tip_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

async fn get_tip(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
) -> Result<Json<HealthTipDto>, ApiError> {
    let tip = backend
        .tip_service
        .get_tip(&id)
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(NotFound("Health tip", id).into()))?;
    Ok(Json(tip_to_dto(tip)))
}

async fn delete_tip(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = backend
        .tip_service
        .delete_tip(&id, &actor_from(&headers))
        .map_err(ApiError)?;
    if !deleted {
        return Err(ApiError(NotFound("Health tip", id).into()));
    }
    Ok(Json(serde_json::json!({ "message": "Health tip deleted" })))
}

async fn tips_by_week(
    State(backend): State<Arc<Backend>>,
    Path(week): Path<u32>,
) -> Result<Json<ListResponse<HealthTipDto>>, ApiError> {
    let tips = backend.tip_service.get_tips_by_week(week).map_err(ApiError)?;
    let data: Vec<HealthTipDto> = tips.into_iter().map(tip_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

async fn personalized_tips(
    State(backend): State<Arc<Backend>>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<HealthTipDto>>, ApiError> {
    let tips = backend
        .tip_service
        .get_personalized_tips(&patient_id)
        .map_err(ApiError)?;
    let data: Vec<HealthTipDto> = tips.into_iter().map(tip_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

// --- Logs ---

async fn recent_logs(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<ActivityLogDto>>, ApiError> {
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(50);
    let entries = backend.log_service.recent(limit).map_err(ApiError)?;
    let data: Vec<ActivityLogDto> = entries.into_iter().map(log_to_dto).collect();
    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}
