use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::Actor;
use shared_models::sinks::{AuditAction, AuditRecord, AuditTrail};

use crate::models::{
    ClinicCalendarDay, CreateWeeklyScheduleRequest, DayOfWeek, ScheduleError,
    UpsertCalendarDayRequest, WeeklySchedule,
};
use crate::store::{DoctorDirectory, ScheduleStore};
use crate::time::ranges_overlap;

/// Administration of per-doctor weekly windows and the clinic-wide calendar.
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    directory: Arc<dyn DoctorDirectory>,
    audit: Arc<dyn AuditTrail>,
}

impl ScheduleService {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        directory: Arc<dyn DoctorDirectory>,
        audit: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            store,
            directory,
            audit,
        }
    }

    /// Add a weekly availability window for a doctor. Rejected when the
    /// range is inverted or overlaps an existing window for that day;
    /// touching ranges are fine.
    pub async fn add_weekly_entry(
        &self,
        actor: &Actor,
        doctor_id: Uuid,
        request: CreateWeeklyScheduleRequest,
    ) -> Result<WeeklySchedule, ScheduleError> {
        debug!("Adding weekly schedule for doctor {}", doctor_id);

        if request.start_time >= request.end_time {
            return Err(ScheduleError::Validation(
                "start time must be before end time".to_string(),
            ));
        }

        if self.directory.find_doctor(doctor_id).await?.is_none() {
            return Err(ScheduleError::NotFound("doctor"));
        }

        let existing = self
            .store
            .weekly_entries_for_day(doctor_id, request.day_of_week)
            .await?;

        for entry in &existing {
            if ranges_overlap(
                request.start_time,
                request.end_time,
                entry.start_time,
                entry.end_time,
            ) {
                return Err(ScheduleError::Conflict(format!(
                    "overlaps existing window {} - {}",
                    entry.start_time, entry.end_time
                )));
            }
        }

        let entry = WeeklySchedule {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
        };

        let created = self.store.insert_weekly_entry(entry).await?;

        info!(
            "Weekly schedule {} created for doctor {} on {}",
            created.id, doctor_id, created.day_of_week
        );
        self.audit(
            actor,
            AuditAction::WeeklyScheduleCreated,
            json!({
                "schedule_id": created.id,
                "doctor_id": doctor_id,
                "day_of_week": created.day_of_week,
                "start_time": created.start_time,
                "end_time": created.end_time,
            }),
        )
        .await;

        Ok(created)
    }

    pub async fn weekly_schedule(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        self.store.weekly_entries_for_doctor(doctor_id).await
    }

    /// The effective calendar entry for a weekday; falls back to the
    /// built-in default week when nothing is configured.
    pub async fn calendar_for(&self, day: DayOfWeek) -> Result<ClinicCalendarDay, ScheduleError> {
        Ok(self
            .store
            .calendar_day(day)
            .await?
            .unwrap_or_else(|| ClinicCalendarDay::default_for(day)))
    }

    pub async fn calendar_week(&self) -> Result<Vec<ClinicCalendarDay>, ScheduleError> {
        let mut week = Vec::with_capacity(DayOfWeek::ALL.len());
        for day in DayOfWeek::ALL {
            week.push(self.calendar_for(day).await?);
        }
        Ok(week)
    }

    /// Partial update of one calendar day over its current (or default)
    /// values.
    pub async fn set_calendar_day(
        &self,
        actor: &Actor,
        day: DayOfWeek,
        request: UpsertCalendarDayRequest,
    ) -> Result<ClinicCalendarDay, ScheduleError> {
        if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
            if start >= end {
                return Err(ScheduleError::Validation(
                    "start time must be before end time".to_string(),
                ));
            }
        }

        let mut entry = self.calendar_for(day).await?;

        if let Some(is_open) = request.is_open {
            entry.is_open = is_open;
        }
        if let Some(start) = request.start_time {
            entry.start_time = start;
        }
        if let Some(end) = request.end_time {
            entry.end_time = end;
        }
        if let Some(break_start) = request.break_start_time {
            entry.break_start_time = Some(break_start);
        }
        if let Some(break_end) = request.break_end_time {
            entry.break_end_time = Some(break_end);
        }

        if entry.start_time >= entry.end_time {
            return Err(ScheduleError::Validation(
                "start time must be before end time".to_string(),
            ));
        }
        if let (Some(break_start), Some(break_end)) = (entry.break_start_time, entry.break_end_time)
        {
            if break_start >= break_end {
                return Err(ScheduleError::Validation(
                    "break start must be before break end".to_string(),
                ));
            }
        }

        let updated = self.store.upsert_calendar_day(entry).await?;

        info!("Clinic calendar updated for {}", day);
        self.audit(
            actor,
            AuditAction::CalendarDayUpdated,
            json!({
                "day_of_week": updated.day_of_week,
                "is_open": updated.is_open,
                "start_time": updated.start_time,
                "end_time": updated.end_time,
                "break_start_time": updated.break_start_time,
                "break_end_time": updated.break_end_time,
            }),
        )
        .await;

        Ok(updated)
    }

    // Audit writes are best-effort; a sink failure never rolls back the
    // mutation it describes.
    async fn audit(&self, actor: &Actor, action: AuditAction, details: serde_json::Value) {
        let entry = AuditRecord {
            action,
            actor_id: actor.id,
            actor_role: actor.role,
            details,
            ip_address: actor.ip_address.clone(),
        };

        if let Err(err) = self.audit.record(entry).await {
            warn!("audit trail write failed for {}: {:#}", action, err);
        }
    }
}
