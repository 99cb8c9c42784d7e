use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentSearchQuery, ServiceRecord};

/// Persistence boundary for appointment records.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Every appointment of one doctor on one date, regardless of status;
    /// the slot engine filters actives itself.
    async fn for_doctor_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError>;
}

/// Read access to the procedure catalog, maintained outside this service.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn services_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceRecord>, AppointmentError>;
}

// ==============================================================================
// SUPABASE-BACKED IMPLEMENTATIONS
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn appointment_body(appointment: &Appointment) -> Value {
        json!({
            "id": appointment.id,
            "patient_id": appointment.patient_id,
            "doctor_id": appointment.doctor_id,
            "service_ids": appointment.service_ids,
            "date": appointment.date,
            "time": appointment.time,
            "status": appointment.status,
            "reschedule_requested": appointment.reschedule_requested,
            "requested_date": appointment.requested_date,
            "requested_time": appointment.requested_time,
            "created_at": appointment.created_at,
            "updated_at": appointment.updated_at,
        })
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::Store(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::Store(format!("failed to parse appointment: {e}")))
    }

    fn single_row(rows: Vec<Value>, op: &str) -> Result<Appointment, AppointmentError> {
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Store(format!("{op} returned no row")))?;

        serde_json::from_value(row)
            .map_err(|e| AppointmentError::Store(format!("failed to parse appointment: {e}")))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn for_doctor_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&order=time.asc",
            doctor_id, date
        );
        self.fetch(&path).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        debug!("Creating appointment {}", appointment.id);

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(Self::appointment_body(&appointment)),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::Store(e.to_string()))?;

        Self::single_row(rows, "insert")
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment.id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Self::appointment_body(&appointment)),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| AppointmentError::Store(e.to_string()))?;

        Self::single_row(rows, "update")
    }

    async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut filters = Vec::new();

        if let Some(patient_id) = query.patient_id {
            filters.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(doctor_id) = query.doctor_id {
            filters.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(date) = query.date {
            filters.push(format!("date=eq.{}", date));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        filters.push("order=date.asc,time.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", filters.join("&"));
        self.fetch(&path).await
    }
}

pub struct SupabaseServiceCatalog {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseServiceCatalog {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ServiceCatalog for SupabaseServiceCatalog {
    async fn services_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceRecord>, AppointmentError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/rest/v1/services?id=in.({})", id_list);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Store(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ServiceRecord>, _>>()
            .map_err(|e| AppointmentError::Store(format!("failed to parse service: {e}")))
    }
}
