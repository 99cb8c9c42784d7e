use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{ClinicCalendarDay, DayOfWeek, Doctor, ScheduleError, WeeklySchedule};

/// Persistence boundary for schedule data. Passed explicitly so the slot
/// computation can run against fixture schedules in tests.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn weekly_entries_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError>;

    async fn weekly_entries_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError>;

    async fn insert_weekly_entry(
        &self,
        entry: WeeklySchedule,
    ) -> Result<WeeklySchedule, ScheduleError>;

    async fn calendar_day(&self, day: DayOfWeek)
        -> Result<Option<ClinicCalendarDay>, ScheduleError>;

    async fn upsert_calendar_day(
        &self,
        day: ClinicCalendarDay,
    ) -> Result<ClinicCalendarDay, ScheduleError>;
}

/// Read access to the doctor roster, maintained by the staff CRUD surface
/// outside this service.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    /// Doctors currently accepting bookings, in a stable order.
    async fn available_doctors(&self) -> Result<Vec<Doctor>, ScheduleError>;

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ScheduleError>;
}

// ==============================================================================
// SUPABASE-BACKED IMPLEMENTATIONS
// ==============================================================================

pub struct SupabaseScheduleStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseScheduleStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    async fn fetch_entries(&self, path: &str) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<WeeklySchedule>, _>>()
            .map_err(|e| ScheduleError::Store(format!("failed to parse weekly schedule: {e}")))
    }
}

#[async_trait]
impl ScheduleStore for SupabaseScheduleStore {
    async fn weekly_entries_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        let path = format!(
            "/rest/v1/weekly_schedules?doctor_id=eq.{}&day_of_week=eq.{}&order=start_time.asc",
            doctor_id, day
        );
        self.fetch_entries(&path).await
    }

    async fn weekly_entries_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        let path = format!(
            "/rest/v1/weekly_schedules?doctor_id=eq.{}&order=day_of_week.asc,start_time.asc",
            doctor_id
        );
        self.fetch_entries(&path).await
    }

    async fn insert_weekly_entry(
        &self,
        entry: WeeklySchedule,
    ) -> Result<WeeklySchedule, ScheduleError> {
        debug!("Creating weekly schedule entry for doctor {}", entry.doctor_id);

        let body = json!({
            "id": entry.id,
            "doctor_id": entry.doctor_id,
            "day_of_week": entry.day_of_week,
            "start_time": entry.start_time,
            "end_time": entry.end_time,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/weekly_schedules",
                Some(body),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Store("insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ScheduleError::Store(format!("failed to parse weekly schedule: {e}")))
    }

    async fn calendar_day(
        &self,
        day: DayOfWeek,
    ) -> Result<Option<ClinicCalendarDay>, ScheduleError> {
        let path = format!("/rest/v1/clinic_calendar?day_of_week=eq.{}", day);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| ScheduleError::Store(format!("failed to parse calendar day: {e}"))),
            None => Ok(None),
        }
    }

    async fn upsert_calendar_day(
        &self,
        day: ClinicCalendarDay,
    ) -> Result<ClinicCalendarDay, ScheduleError> {
        debug!("Upserting clinic calendar for {}", day.day_of_week);

        let body = json!({
            "day_of_week": day.day_of_week,
            "is_open": day.is_open,
            "start_time": day.start_time,
            "end_time": day.end_time,
            "break_start_time": day.break_start_time,
            "break_end_time": day.break_end_time,
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("return=representation,resolution=merge-duplicates"),
        );

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/clinic_calendar?on_conflict=day_of_week",
                Some(body),
                Some(headers),
            )
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Store("upsert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ScheduleError::Store(format!("failed to parse calendar day: {e}")))
    }
}

pub struct SupabaseDoctorDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn available_doctors(&self) -> Result<Vec<Doctor>, ScheduleError> {
        // Ordered by id so doctor assignment stays deterministic.
        let path = "/rest/v1/doctors?is_available=eq.true&order=id.asc";
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| ScheduleError::Store(format!("failed to parse doctor: {e}")))
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ScheduleError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| ScheduleError::Store(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| ScheduleError::Store(format!("failed to parse doctor: {e}"))),
            None => Ok(None),
        }
    }
}
