use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::AppointmentCell;
use schedule_cell::services::ScheduleService;
use schedule_cell::store::{SupabaseDoctorDirectory, SupabaseScheduleStore};
use shared_config::AppConfig;
use shared_database::sinks::{SupabaseAuditTrail, SupabaseNotifier};
use shared_database::supabase::SupabaseClient;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dental Clinic API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wire stores and sinks against the backing database once; services
    // receive them as explicit dependencies.
    let supabase = Arc::new(SupabaseClient::new(&config));
    let schedule_store = Arc::new(SupabaseScheduleStore::new(Arc::clone(&supabase)));
    let directory = Arc::new(SupabaseDoctorDirectory::new(Arc::clone(&supabase)));
    let appointment_store = Arc::new(
        appointment_cell::store::SupabaseAppointmentStore::new(Arc::clone(&supabase)),
    );
    let catalog = Arc::new(appointment_cell::store::SupabaseServiceCatalog::new(
        Arc::clone(&supabase),
    ));
    let notifier = Arc::new(SupabaseNotifier::new(Arc::clone(&supabase)));
    let audit = Arc::new(SupabaseAuditTrail::new(Arc::clone(&supabase)));

    let schedule_service = Arc::new(ScheduleService::new(
        schedule_store.clone(),
        directory.clone(),
        audit.clone(),
    ));
    let appointment_cell = Arc::new(AppointmentCell::new(
        schedule_store,
        directory,
        appointment_store,
        catalog,
        notifier,
        audit,
        config.slot_granularity_minutes,
    ));

    // Build the application router
    let app = router::create_router(schedule_service, appointment_cell)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
