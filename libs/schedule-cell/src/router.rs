use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::services::ScheduleService;

pub fn schedule_routes(service: Arc<ScheduleService>) -> Router {
    Router::new()
        .route(
            "/doctors/{doctor_id}/weekly",
            post(handlers::create_weekly_entry).get(handlers::list_weekly_entries),
        )
        .route("/calendar", get(handlers::get_calendar_week))
        .route("/calendar/{day}", put(handlers::set_calendar_day))
        .with_state(service)
}
