use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use schedule_cell::models::{ClinicCalendarDay, DayOfWeek};
use schedule_cell::store::ScheduleStore;
use schedule_cell::time::{overlaps_break, ranges_overlap, TimeOfDay};

use crate::models::AppointmentError;
use crate::services::duration::combined_duration;
use crate::store::{AppointmentStore, ServiceCatalog};

/// Slot computation for one doctor and date. Stateless per call; results
/// are recomputed fresh every time.
#[derive(Clone)]
pub struct SlotEngine {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    granularity_minutes: u16,
}

impl SlotEngine {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        granularity_minutes: u16,
    ) -> Self {
        Self {
            schedules,
            appointments,
            catalog,
            granularity_minutes,
        }
    }

    /// All bookable start times for the given doctor, date and duration,
    /// in ascending order. Empty when the clinic is closed that day or the
    /// doctor has no working window; callers treat empty as "no
    /// availability", not as a failure.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<TimeOfDay>, AppointmentError> {
        let day = DayOfWeek::from_date(date);
        let calendar = self.calendar_for(day).await?;
        if !calendar.is_open {
            debug!("No slots on {}: clinic closed", date);
            return Ok(Vec::new());
        }

        // The doctor's own window is authoritative; the clinic calendar
        // gates the day open or closed but does not narrow the window.
        let Some(window) = self
            .schedules
            .weekly_entries_for_day(doctor_id, day)
            .await?
            .into_iter()
            .next()
        else {
            debug!("No slots on {}: doctor {} has no window", date, doctor_id);
            return Ok(Vec::new());
        };

        let booked = self.active_intervals(doctor_id, date, None).await?;

        let mut slots = Vec::new();
        let mut candidate = window.start_time;
        while candidate < window.end_time {
            let end = candidate.add_minutes(duration_minutes);
            let fits = end <= window.end_time
                && !overlaps_break(
                    candidate,
                    end,
                    calendar.break_start_time,
                    calendar.break_end_time,
                )
                && !booked
                    .iter()
                    .any(|&(start, finish)| ranges_overlap(candidate, end, start, finish));
            if fits {
                slots.push(candidate);
            }
            candidate = candidate.add_minutes(self.granularity_minutes as u32);
        }

        Ok(slots)
    }

    /// Point query: would `[start, start+duration)` collide with any active
    /// appointment of this doctor on this date? Each existing appointment's
    /// length is re-derived from its recorded services, never assumed.
    pub async fn is_slot_taken(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start: TimeOfDay,
        duration_minutes: u32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        let booked = self
            .active_intervals(doctor_id, date, exclude_appointment_id)
            .await?;
        let end = start.add_minutes(duration_minutes);

        Ok(booked
            .iter()
            .any(|&(taken_start, taken_end)| ranges_overlap(start, end, taken_start, taken_end)))
    }

    /// Full validation of one concrete slot for a named doctor: the clinic
    /// must be open, the slot must sit inside the doctor's window, clear of
    /// the break, and free of other active bookings.
    pub async fn ensure_bookable(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start: TimeOfDay,
        duration_minutes: u32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let day = DayOfWeek::from_date(date);
        let calendar = self.calendar_for(day).await?;
        if !calendar.is_open {
            return Err(AppointmentError::Conflict(format!(
                "the clinic is closed on {}",
                day
            )));
        }

        let Some(window) = self
            .schedules
            .weekly_entries_for_day(doctor_id, day)
            .await?
            .into_iter()
            .next()
        else {
            return Err(AppointmentError::Conflict(format!(
                "doctor is not scheduled to work on {}",
                day
            )));
        };

        let end = start.add_minutes(duration_minutes);
        if start < window.start_time || end > window.end_time {
            return Err(AppointmentError::Conflict(
                "requested time falls outside the doctor's working hours".to_string(),
            ));
        }
        if overlaps_break(start, end, calendar.break_start_time, calendar.break_end_time) {
            return Err(AppointmentError::Conflict(
                "requested time overlaps the clinic break".to_string(),
            ));
        }
        if self
            .is_slot_taken(doctor_id, date, start, duration_minutes, exclude_appointment_id)
            .await?
        {
            return Err(AppointmentError::Conflict(
                "requested slot is already booked".to_string(),
            ));
        }

        Ok(())
    }

    async fn calendar_for(&self, day: DayOfWeek) -> Result<ClinicCalendarDay, AppointmentError> {
        Ok(self
            .schedules
            .calendar_day(day)
            .await?
            .unwrap_or_else(|| ClinicCalendarDay::default_for(day)))
    }

    /// Occupied `[start, end)` intervals for the doctor's active (not
    /// cancelled) appointments on a date.
    async fn active_intervals(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<(TimeOfDay, TimeOfDay)>, AppointmentError> {
        let appointments = self.appointments.for_doctor_on(doctor_id, date).await?;

        let mut intervals = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            if !appointment.status.is_active() {
                continue;
            }
            if exclude_appointment_id == Some(appointment.id) {
                continue;
            }

            let services = self.catalog.services_by_ids(&appointment.service_ids).await?;
            let duration = combined_duration(&services);
            intervals.push((appointment.time, appointment.time.add_minutes(duration)));
        }

        Ok(intervals)
    }
}
