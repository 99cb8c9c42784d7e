//! In-memory store fixtures for deterministic tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ClinicCalendarDay, DayOfWeek, Doctor, ScheduleError, WeeklySchedule};
use crate::store::{DoctorDirectory, ScheduleStore};
use crate::time::TimeOfDay;

#[derive(Default)]
pub struct InMemoryScheduleStore {
    entries: RwLock<Vec<WeeklySchedule>>,
    calendar: RwLock<HashMap<DayOfWeek, ClinicCalendarDay>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a doctor window without going through the service validation.
    pub fn with_entry(
        self,
        doctor_id: Uuid,
        day: DayOfWeek,
        start: &str,
        end: &str,
    ) -> Self {
        self.entries
            .write()
            .expect("schedule fixture lock")
            .push(WeeklySchedule {
                id: Uuid::new_v4(),
                doctor_id,
                day_of_week: day,
                start_time: parse_time(start),
                end_time: parse_time(end),
            });
        self
    }

    pub fn with_calendar_day(self, day: ClinicCalendarDay) -> Self {
        self.calendar
            .write()
            .expect("calendar fixture lock")
            .insert(day.day_of_week, day);
        self
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn weekly_entries_for_day(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        Ok(self
            .entries
            .read()
            .expect("schedule fixture lock")
            .iter()
            .filter(|entry| entry.doctor_id == doctor_id && entry.day_of_week == day)
            .cloned()
            .collect())
    }

    async fn weekly_entries_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        Ok(self
            .entries
            .read()
            .expect("schedule fixture lock")
            .iter()
            .filter(|entry| entry.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn insert_weekly_entry(
        &self,
        entry: WeeklySchedule,
    ) -> Result<WeeklySchedule, ScheduleError> {
        self.entries
            .write()
            .expect("schedule fixture lock")
            .push(entry.clone());
        Ok(entry)
    }

    async fn calendar_day(
        &self,
        day: DayOfWeek,
    ) -> Result<Option<ClinicCalendarDay>, ScheduleError> {
        Ok(self
            .calendar
            .read()
            .expect("calendar fixture lock")
            .get(&day)
            .cloned())
    }

    async fn upsert_calendar_day(
        &self,
        day: ClinicCalendarDay,
    ) -> Result<ClinicCalendarDay, ScheduleError> {
        self.calendar
            .write()
            .expect("calendar fixture lock")
            .insert(day.day_of_week, day.clone());
        Ok(day)
    }
}

pub struct InMemoryDoctorDirectory {
    doctors: Vec<Doctor>,
}

impl InMemoryDoctorDirectory {
    pub fn new(mut doctors: Vec<Doctor>) -> Self {
        doctors.sort_by_key(|doctor| doctor.id);
        Self { doctors }
    }

    pub fn single(doctor_id: Uuid) -> Self {
        Self::new(vec![Doctor {
            id: doctor_id,
            full_name: "Dr. Test".to_string(),
            is_available: true,
        }])
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn available_doctors(&self) -> Result<Vec<Doctor>, ScheduleError> {
        Ok(self
            .doctors
            .iter()
            .filter(|doctor| doctor.is_available)
            .cloned()
            .collect())
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ScheduleError> {
        Ok(self
            .doctors
            .iter()
            .find(|doctor| doctor.id == doctor_id)
            .cloned())
    }
}

/// Audit sink that only counts writes; lifecycle tests assert transitions
/// survive sink failures separately.
#[derive(Default)]
pub struct RecordingAuditTrail {
    pub records: RwLock<Vec<shared_models::sinks::AuditRecord>>,
}

#[async_trait]
impl shared_models::sinks::AuditTrail for RecordingAuditTrail {
    async fn record(&self, entry: shared_models::sinks::AuditRecord) -> anyhow::Result<()> {
        self.records.write().expect("audit fixture lock").push(entry);
        Ok(())
    }
}

fn parse_time(raw: &str) -> TimeOfDay {
    raw.parse().expect("fixture times are well-formed")
}
