use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppointmentCell;

pub fn appointment_routes(cell: Arc<AppointmentCell>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::book_appointment).get(handlers::list_appointments),
        )
        .route("/available-slots", get(handlers::get_available_slots))
        .route("/find-doctor", get(handlers::find_doctor))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/cancellation-request",
            post(handlers::request_cancellation),
        )
        .route(
            "/{appointment_id}/cancellation-request/approve",
            post(handlers::approve_cancellation),
        )
        .route(
            "/{appointment_id}/cancellation-request/reject",
            post(handlers::reject_cancellation),
        )
        .route(
            "/{appointment_id}/reschedule-request",
            post(handlers::request_reschedule),
        )
        .route(
            "/{appointment_id}/reschedule-request/approve",
            post(handlers::approve_reschedule),
        )
        .route(
            "/{appointment_id}/reschedule-request/reject",
            post(handlers::reject_reschedule),
        )
        .with_state(cell)
}
