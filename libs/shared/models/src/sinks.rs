use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::ActorRole;

/// Message handed to the notification service on lifecycle transitions.
/// Delivery is the notification service's problem; the scheduling core
/// neither retries nor verifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Appointment,
    Cancellation,
    Reschedule,
    Schedule,
}

/// Audit trail entry for lifecycle transitions and schedule mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: AuditAction,
    pub actor_id: Uuid,
    pub actor_role: ActorRole,
    pub details: Value,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AppointmentBooked,
    AppointmentConfirmed,
    AppointmentCompleted,
    AppointmentCancelled,
    CancellationRequested,
    CancellationApproved,
    CancellationRejected,
    RescheduleRequested,
    RescheduleApproved,
    RescheduleRejected,
    WeeklyScheduleCreated,
    CalendarDayUpdated,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditAction::AppointmentBooked => "appointment_booked",
            AuditAction::AppointmentConfirmed => "appointment_confirmed",
            AuditAction::AppointmentCompleted => "appointment_completed",
            AuditAction::AppointmentCancelled => "appointment_cancelled",
            AuditAction::CancellationRequested => "cancellation_requested",
            AuditAction::CancellationApproved => "cancellation_approved",
            AuditAction::CancellationRejected => "cancellation_rejected",
            AuditAction::RescheduleRequested => "reschedule_requested",
            AuditAction::RescheduleApproved => "reschedule_approved",
            AuditAction::RescheduleRejected => "reschedule_rejected",
            AuditAction::WeeklyScheduleCreated => "weekly_schedule_created",
            AuditAction::CalendarDayUpdated => "calendar_day_updated",
        };
        write!(f, "{}", name)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: NotificationMessage) -> Result<()>;
}

#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn record(&self, entry: AuditRecord) -> Result<()>;
}
