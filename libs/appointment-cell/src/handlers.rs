use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use schedule_cell::time::TimeOfDay;
use shared_models::auth::Actor;
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, BookAppointmentRequest,
    RescheduleProposalRequest,
};
use crate::services::LifecycleEvent;
use crate::AppointmentCell;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Comma-separated service ids; empty means the default visit length.
    pub service_ids: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FindDoctorQuery {
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub service_ids: Option<String>,
}

fn parse_service_ids(raw: &Option<String>) -> Result<Vec<Uuid>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            Uuid::parse_str(part.trim())
                .map_err(|_| AppError::BadRequest(format!("invalid service id: {part}")))
        })
        .collect()
}

fn map_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        AppointmentError::Conflict(msg) => AppError::Conflict(msg),
        AppointmentError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
        // "Nothing fits" is an expected outcome, not a server fault.
        AppointmentError::Unavailable(msg) => AppError::NotFound(msg),
        AppointmentError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
        AppointmentError::Store(msg) => AppError::Internal(msg),
    }
}

fn require_staff(actor: &Actor) -> Result<(), AppError> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(AppError::Auth(
            "Only staff can perform this action".to_string(),
        ))
    }
}

fn ensure_can_access(actor: &Actor, appointment: &Appointment) -> Result<(), AppError> {
    if actor.is_staff() || appointment.patient_id == actor.id {
        Ok(())
    } else {
        Err(AppError::Auth(
            "Not authorized to access this appointment".to_string(),
        ))
    }
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(cell): State<Arc<AppointmentCell>>,
    actor: Actor,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    // Patients book for themselves; staff may book on anyone's behalf.
    if !actor.is_staff() && request.patient_id != actor.id {
        return Err(AppError::Auth(
            "Not authorized to book for this patient".to_string(),
        ));
    }

    let appointment = cell
        .booking
        .book_appointment(&actor, request)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(cell): State<Arc<AppointmentCell>>,
    _actor: Actor,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service_ids = parse_service_ids(&query.service_ids)?;

    let slots = cell
        .booking
        .available_slots(query.doctor_id, query.date, &service_ids)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "date": query.date,
        "slots": slots,
    })))
}

#[axum::debug_handler]
pub async fn find_doctor(
    State(cell): State<Arc<AppointmentCell>>,
    _actor: Actor,
    Query(query): Query<FindDoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let service_ids = parse_service_ids(&query.service_ids)?;

    let doctor_id = cell
        .booking
        .find_doctor(query.date, query.time, &service_ids)
        .await
        .map_err(map_error)?
        .ok_or_else(|| {
            AppError::NotFound("all doctors are fully booked at the requested time".to_string())
        })?;

    Ok(Json(json!({ "doctor_id": doctor_id })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    let appointment = cell
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_error)?;

    ensure_can_access(&actor, &appointment)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(cell): State<Arc<AppointmentCell>>,
    actor: Actor,
    Query(mut query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    // Patients only ever see their own bookings.
    if !actor.is_staff() {
        query.patient_id = Some(actor.id);
    }

    let appointments = cell
        .booking
        .search_appointments(query)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

async fn apply_staff_event(
    cell: &AppointmentCell,
    actor: Actor,
    appointment_id: Uuid,
    event: LifecycleEvent,
) -> Result<Json<Value>, AppError> {
    require_staff(&actor)?;

    let appointment = cell
        .lifecycle
        .apply_event(&actor, appointment_id, event)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    apply_staff_event(&cell, actor, appointment_id, LifecycleEvent::Confirm).await
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    apply_staff_event(&cell, actor, appointment_id, LifecycleEvent::Complete).await
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    apply_staff_event(&cell, actor, appointment_id, LifecycleEvent::Cancel).await
}

#[axum::debug_handler]
pub async fn request_cancellation(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    let appointment = cell
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_error)?;
    ensure_can_access(&actor, &appointment)?;

    let appointment = cell
        .lifecycle
        .apply_event(&actor, appointment_id, LifecycleEvent::RequestCancellation)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn approve_cancellation(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    apply_staff_event(&cell, actor, appointment_id, LifecycleEvent::ApproveCancellation).await
}

#[axum::debug_handler]
pub async fn reject_cancellation(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    apply_staff_event(&cell, actor, appointment_id, LifecycleEvent::RejectCancellation).await
}

#[axum::debug_handler]
pub async fn request_reschedule(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
    Json(proposal): Json<RescheduleProposalRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = cell
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_error)?;
    ensure_can_access(&actor, &appointment)?;

    let appointment = cell
        .lifecycle
        .request_reschedule(&actor, appointment_id, proposal)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn approve_reschedule(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    require_staff(&actor)?;

    let appointment = cell
        .lifecycle
        .approve_reschedule(&actor, appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn reject_reschedule(
    State(cell): State<Arc<AppointmentCell>>,
    Path(appointment_id): Path<Uuid>,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    require_staff(&actor)?;

    let appointment = cell
        .lifecycle
        .reject_reschedule(&actor, appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}
