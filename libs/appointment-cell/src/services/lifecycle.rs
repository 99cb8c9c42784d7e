use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::Actor;
use shared_models::sinks::{
    AuditAction, AuditRecord, AuditTrail, NotificationKind, NotificationMessage, Notifier,
};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, RescheduleProposalRequest};
use crate::services::duration::combined_duration;
use crate::services::locks::DoctorSlotLocks;
use crate::services::slots::SlotEngine;
use crate::store::{AppointmentStore, ServiceCatalog};

// ==============================================================================
// STATE MACHINE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Confirm,
    Complete,
    Cancel,
    RequestCancellation,
    ApproveCancellation,
    RejectCancellation,
}

impl LifecycleEvent {
    pub fn name(self) -> &'static str {
        match self {
            LifecycleEvent::Confirm => "confirm",
            LifecycleEvent::Complete => "complete",
            LifecycleEvent::Cancel => "cancel",
            LifecycleEvent::RequestCancellation => "request cancellation of",
            LifecycleEvent::ApproveCancellation => "approve cancellation of",
            LifecycleEvent::RejectCancellation => "reject cancellation of",
        }
    }

    fn audit_action(self) -> AuditAction {
        match self {
            LifecycleEvent::Confirm => AuditAction::AppointmentConfirmed,
            LifecycleEvent::Complete => AuditAction::AppointmentCompleted,
            LifecycleEvent::Cancel => AuditAction::AppointmentCancelled,
            LifecycleEvent::RequestCancellation => AuditAction::CancellationRequested,
            LifecycleEvent::ApproveCancellation => AuditAction::CancellationApproved,
            LifecycleEvent::RejectCancellation => AuditAction::CancellationRejected,
        }
    }

    fn notification(self) -> (NotificationKind, &'static str, &'static str) {
        match self {
            LifecycleEvent::Confirm => (
                NotificationKind::Appointment,
                "Appointment confirmed",
                "Your appointment has been confirmed.",
            ),
            LifecycleEvent::Complete => (
                NotificationKind::Appointment,
                "Appointment completed",
                "Thank you for your visit.",
            ),
            LifecycleEvent::Cancel => (
                NotificationKind::Cancellation,
                "Appointment cancelled",
                "Your appointment has been cancelled.",
            ),
            LifecycleEvent::RequestCancellation => (
                NotificationKind::Cancellation,
                "Cancellation requested",
                "Your cancellation request is awaiting review.",
            ),
            LifecycleEvent::ApproveCancellation => (
                NotificationKind::Cancellation,
                "Cancellation approved",
                "Your appointment has been cancelled as requested.",
            ),
            LifecycleEvent::RejectCancellation => (
                NotificationKind::Cancellation,
                "Cancellation declined",
                "Your appointment remains as booked.",
            ),
        }
    }
}

/// The full transition table. Completed and cancelled are terminal;
/// everything not listed here is illegal.
pub fn next_status(
    current: AppointmentStatus,
    event: LifecycleEvent,
) -> Result<AppointmentStatus, AppointmentError> {
    use AppointmentStatus::*;
    use LifecycleEvent::*;

    match (current, event) {
        (Pending, Confirm) => Ok(Confirmed),
        (Confirmed, Complete) => Ok(Completed),
        (Pending | Confirmed, Cancel) => Ok(Cancelled),
        (Pending | Confirmed, RequestCancellation) => Ok(CancellationRequested),
        (CancellationRequested, ApproveCancellation) => Ok(Cancelled),
        (CancellationRequested, RejectCancellation) => Ok(Confirmed),
        (from, event) => Err(AppointmentError::InvalidTransition {
            from,
            event: event.name(),
        }),
    }
}

// ==============================================================================
// LIFECYCLE SERVICE
// ==============================================================================

pub struct LifecycleService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    slots: SlotEngine,
    locks: DoctorSlotLocks,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditTrail>,
}

impl LifecycleService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        slots: SlotEngine,
        locks: DoctorSlotLocks,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            appointments,
            catalog,
            slots,
            locks,
            notifier,
            audit,
        }
    }

    /// Apply one lifecycle event to an appointment. Ownership and role
    /// gating happen in the handlers; this only enforces the machine.
    pub async fn apply_event(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        event: LifecycleEvent,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Applying {:?} to appointment {}", event, appointment_id);

        let mut appointment = self.load(appointment_id).await?;
        appointment.status = next_status(appointment.status, event)?;
        appointment.updated_at = Utc::now();

        let updated = self.appointments.update(appointment).await?;

        info!(
            "Appointment {} is now {}",
            updated.id, updated.status
        );
        self.emit(actor, &updated, event.audit_action(), event.notification())
            .await;

        Ok(updated)
    }

    /// Attach a reschedule proposal to a confirmed appointment. The booking
    /// itself does not move until staff approve.
    pub async fn request_reschedule(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        proposal: RescheduleProposalRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;

        if appointment.status != AppointmentStatus::Confirmed {
            return Err(AppointmentError::InvalidTransition {
                from: appointment.status,
                event: "request rescheduling of",
            });
        }

        appointment.reschedule_requested = true;
        appointment.requested_date = Some(proposal.new_date);
        appointment.requested_time = Some(proposal.new_time);
        appointment.updated_at = Utc::now();

        let updated = self.appointments.update(appointment).await?;

        info!("Reschedule requested for appointment {}", updated.id);
        self.emit(
            actor,
            &updated,
            AuditAction::RescheduleRequested,
            (
                NotificationKind::Reschedule,
                "Reschedule requested",
                "Your reschedule request is awaiting review.",
            ),
        )
        .await;

        Ok(updated)
    }

    /// Approve a pending reschedule proposal. The proposed slot is
    /// re-validated under the doctor's lock, ignoring the appointment's own
    /// current booking; on conflict the original booking stays untouched.
    pub async fn approve_reschedule(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;

        let (new_date, new_time) = match (
            appointment.reschedule_requested,
            appointment.requested_date,
            appointment.requested_time,
        ) {
            (true, Some(date), Some(time)) => (date, time),
            _ => {
                return Err(AppointmentError::Validation(
                    "appointment has no pending reschedule request".to_string(),
                ))
            }
        };

        let services = self
            .catalog
            .services_by_ids(&appointment.service_ids)
            .await?;
        let duration = combined_duration(&services);

        let _guard = self.locks.acquire(appointment.doctor_id).await;
        self.slots
            .ensure_bookable(
                appointment.doctor_id,
                new_date,
                new_time,
                duration,
                Some(appointment.id),
            )
            .await?;

        appointment.date = new_date;
        appointment.time = new_time;
        appointment.reschedule_requested = false;
        appointment.requested_date = None;
        appointment.requested_time = None;
        appointment.updated_at = Utc::now();

        let updated = self.appointments.update(appointment).await?;

        info!(
            "Appointment {} rescheduled to {} {}",
            updated.id, updated.date, updated.time
        );
        self.emit(
            actor,
            &updated,
            AuditAction::RescheduleApproved,
            (
                NotificationKind::Reschedule,
                "Appointment rescheduled",
                "Your appointment has been moved to the requested time.",
            ),
        )
        .await;

        Ok(updated)
    }

    /// Decline a pending reschedule proposal, leaving the original booking
    /// in place.
    pub async fn reject_reschedule(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;

        if !appointment.reschedule_requested {
            return Err(AppointmentError::Validation(
                "appointment has no pending reschedule request".to_string(),
            ));
        }

        appointment.reschedule_requested = false;
        appointment.requested_date = None;
        appointment.requested_time = None;
        appointment.updated_at = Utc::now();

        let updated = self.appointments.update(appointment).await?;

        info!("Reschedule rejected for appointment {}", updated.id);
        self.emit(
            actor,
            &updated,
            AuditAction::RescheduleRejected,
            (
                NotificationKind::Reschedule,
                "Reschedule declined",
                "Your appointment keeps its original time.",
            ),
        )
        .await;

        Ok(updated)
    }

    async fn load(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .find(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("appointment"))
    }

    // Notification and audit are fire-and-forget: a sink failure must never
    // roll back the transition it describes.
    async fn emit(
        &self,
        actor: &Actor,
        appointment: &Appointment,
        action: AuditAction,
        (kind, title, message): (NotificationKind, &'static str, &'static str),
    ) {
        let notification = NotificationMessage {
            recipient_id: appointment.patient_id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        };
        if let Err(err) = self.notifier.notify(notification).await {
            warn!("notification dispatch failed for {}: {:#}", action, err);
        }

        let entry = AuditRecord {
            action,
            actor_id: actor.id,
            actor_role: actor.role,
            details: json!({
                "appointment_id": appointment.id,
                "doctor_id": appointment.doctor_id,
                "patient_id": appointment.patient_id,
                "date": appointment.date,
                "time": appointment.time,
                "status": appointment.status,
            }),
            ip_address: actor.ip_address.clone(),
        };
        if let Err(err) = self.audit.record(entry).await {
            warn!("audit trail write failed for {}: {:#}", action, err);
        }
    }
}
