use std::sync::Arc;

use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::store::{
    AppointmentStore, ServiceCatalog, SupabaseAppointmentStore, SupabaseServiceCatalog,
};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: base_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        port: 3000,
        slot_granularity_minutes: 15,
    }
}

#[tokio::test]
async fn appointments_round_trip_through_postgrest_rows() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "service_ids": [Uuid::new_v4()],
            "date": "2030-06-03",
            "time": "09:30:00",
            "status": "confirmed",
            "reschedule_requested": false,
            "requested_date": null,
            "requested_time": null,
            "created_at": "2030-06-01T08:00:00Z",
            "updated_at": "2030-06-01T08:00:00Z"
        })]))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let store = SupabaseAppointmentStore::new(Arc::new(SupabaseClient::new(&config)));

    let appointments = store
        .for_doctor_on(doctor_id, "2030-06-03".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].time.to_string(), "09:30");
    assert_eq!(appointments[0].status.to_string(), "confirmed");
}

#[tokio::test]
async fn catalog_reads_numeric_and_textual_durations() {
    let mock_server = MockServer::start().await;
    let cleaning = Uuid::new_v4();
    let surgery = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            serde_json::json!({
                "id": cleaning,
                "name": "Teeth Cleaning",
                "duration": 30
            }),
            serde_json::json!({
                "id": surgery,
                "name": "Oral Surgery",
                "duration": "2 hours"
            }),
        ]))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let catalog = SupabaseServiceCatalog::new(Arc::new(SupabaseClient::new(&config)));

    let services = catalog.services_by_ids(&[cleaning, surgery]).await.unwrap();
    assert_eq!(services.len(), 2);

    use appointment_cell::services::duration::resolve;
    assert_eq!(resolve(&services[0]), 30);
    assert_eq!(resolve(&services[1]), 120);
}

#[tokio::test]
async fn empty_id_list_skips_the_catalog_round_trip() {
    // No mock mounted: a request would fail, so this passing proves the
    // store short-circuits.
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let catalog = SupabaseServiceCatalog::new(Arc::new(SupabaseClient::new(&config)));

    let services = catalog.services_by_ids(&[]).await.unwrap();
    assert!(services.is_empty());
}
