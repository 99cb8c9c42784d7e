use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::models::ScheduleError;
use schedule_cell::time::TimeOfDay;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub status: AppointmentStatus,
    /// Overlay on a confirmed appointment: a proposed re-date awaiting
    /// staff approval. Not a status of its own.
    pub reschedule_requested: bool,
    pub requested_date: Option<NaiveDate>,
    pub requested_time: Option<TimeOfDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    CancellationRequested,
}

impl AppointmentStatus {
    /// Everything except a cancelled appointment keeps its slot occupied.
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::CancellationRequested => write!(f, "cancellation_requested"),
        }
    }
}

/// Catalog entry for a bookable procedure. The duration column is free-form
/// legacy data: a bare number of minutes, or text like "1 hour 30 minutes";
/// many rows carry nothing at all and rely on the name heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub duration: Option<DurationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Minutes(f64),
    Text(String),
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    /// Absent means "any available doctor"; assignment goes through the
    /// doctor finder.
    pub doctor_id: Option<Uuid>,
    pub service_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleProposalRequest {
    pub new_date: NaiveDate,
    pub new_time: TimeOfDay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Nothing fits the request; distinct from a conflict on a concrete
    /// slot. Surfaced as "fully booked", never as a server fault.
    #[error("{0}")]
    Unavailable(String),

    #[error("cannot {event} an appointment in status {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        event: &'static str,
    },

    #[error("appointment store failure: {0}")]
    Store(String),
}

impl From<ScheduleError> for AppointmentError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Validation(msg) => AppointmentError::Validation(msg),
            ScheduleError::Conflict(msg) => AppointmentError::Conflict(msg),
            ScheduleError::NotFound(what) => AppointmentError::NotFound(what),
            ScheduleError::Store(msg) => AppointmentError::Store(msg),
        }
    }
}
