use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Actor;
use shared_models::error::AppError;

use crate::models::{
    CreateWeeklyScheduleRequest, DayOfWeek, ScheduleError, UpsertCalendarDayRequest,
};
use crate::services::ScheduleService;

fn map_error(err: ScheduleError) -> AppError {
    match err {
        ScheduleError::Validation(msg) => AppError::BadRequest(msg),
        ScheduleError::Conflict(msg) => AppError::Conflict(msg),
        ScheduleError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
        ScheduleError::Store(msg) => AppError::Internal(msg),
    }
}

fn require_staff(actor: &Actor) -> Result<(), AppError> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(AppError::Auth(
            "Only staff can manage schedules".to_string(),
        ))
    }
}

#[axum::debug_handler]
pub async fn create_weekly_entry(
    State(service): State<Arc<ScheduleService>>,
    Path(doctor_id): Path<Uuid>,
    actor: Actor,
    Json(request): Json<CreateWeeklyScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&actor)?;

    let entry = service
        .add_weekly_entry(&actor, doctor_id, request)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule": entry,
    })))
}

#[axum::debug_handler]
pub async fn list_weekly_entries(
    State(service): State<Arc<ScheduleService>>,
    Path(doctor_id): Path<Uuid>,
    _actor: Actor,
) -> Result<Json<Value>, AppError> {
    let entries = service.weekly_schedule(doctor_id).await.map_err(map_error)?;

    Ok(Json(json!({ "schedules": entries })))
}

#[axum::debug_handler]
pub async fn get_calendar_week(
    State(service): State<Arc<ScheduleService>>,
) -> Result<Json<Value>, AppError> {
    let week = service.calendar_week().await.map_err(map_error)?;

    Ok(Json(json!({ "calendar": week })))
}

#[axum::debug_handler]
pub async fn set_calendar_day(
    State(service): State<Arc<ScheduleService>>,
    Path(day): Path<String>,
    actor: Actor,
    Json(request): Json<UpsertCalendarDayRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&actor)?;

    let day: DayOfWeek = day
        .parse()
        .map_err(|err: String| AppError::BadRequest(err))?;

    let updated = service
        .set_calendar_day(&actor, day, request)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "calendar_day": updated,
    })))
}
