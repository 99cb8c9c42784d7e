use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentCell;
use schedule_cell::router::schedule_routes;
use schedule_cell::services::ScheduleService;

pub fn create_router(
    schedule_service: Arc<ScheduleService>,
    appointment_cell: Arc<AppointmentCell>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Clinic API is running!" }))
        .nest("/appointments", appointment_routes(appointment_cell))
        .nest("/schedules", schedule_routes(schedule_service))
}
