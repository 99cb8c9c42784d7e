use std::sync::Arc;

use chrono::{NaiveDate, Timelike, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::store::DoctorDirectory;
use schedule_cell::time::TimeOfDay;
use shared_models::auth::Actor;
use shared_models::sinks::{
    AuditAction, AuditRecord, AuditTrail, NotificationKind, NotificationMessage, Notifier,
};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest, ServiceRecord,
};
use crate::services::duration::combined_duration;
use crate::services::finder::DoctorFinder;
use crate::services::locks::DoctorSlotLocks;
use crate::services::slots::SlotEngine;
use crate::store::{AppointmentStore, ServiceCatalog};

/// Booking intake: validates the request, resolves the doctor, and creates
/// the appointment record under the doctor's slot lock.
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    directory: Arc<dyn DoctorDirectory>,
    slots: SlotEngine,
    finder: DoctorFinder,
    locks: DoctorSlotLocks,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditTrail>,
}

impl BookingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        directory: Arc<dyn DoctorDirectory>,
        slots: SlotEngine,
        finder: DoctorFinder,
        locks: DoctorSlotLocks,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            appointments,
            catalog,
            directory,
            slots,
            finder,
            locks,
            notifier,
            audit,
        }
    }

    pub async fn book_appointment(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking appointment for patient {} with doctor {:?}",
            request.patient_id, request.doctor_id
        );

        self.validate_request(&request)?;
        let services = self.load_services(&request.service_ids).await?;
        let duration = combined_duration(&services);

        let appointment = match request.doctor_id {
            Some(doctor_id) => {
                if self.directory.find_doctor(doctor_id).await?.is_none() {
                    return Err(AppointmentError::NotFound("doctor"));
                }

                let _guard = self.locks.acquire(doctor_id).await;
                self.slots
                    .ensure_bookable(doctor_id, request.date, request.time, duration, None)
                    .await?;
                self.create(actor, &request, doctor_id).await?
            }
            None => {
                let Some(doctor_id) = self
                    .finder
                    .find_available_doctor(request.date, request.time, duration, None)
                    .await?
                else {
                    return Err(AppointmentError::Unavailable(
                        "all doctors are fully booked at the requested time".to_string(),
                    ));
                };

                // Re-check under the lock: another request may have taken
                // the slot between the scan and here.
                let _guard = self.locks.acquire(doctor_id).await;
                if self
                    .slots
                    .is_slot_taken(doctor_id, request.date, request.time, duration, None)
                    .await?
                {
                    return Err(AppointmentError::Conflict(
                        "requested slot is already booked".to_string(),
                    ));
                }
                self.create(actor, &request, doctor_id).await?
            }
        };

        Ok(appointment)
    }

    /// Bookable start times for a doctor/date given a service selection.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        service_ids: &[Uuid],
    ) -> Result<Vec<TimeOfDay>, AppointmentError> {
        let services = self.load_services(service_ids).await?;
        let duration = combined_duration(&services);
        self.slots.available_slots(doctor_id, date, duration).await
    }

    /// Expose the doctor finder so the booking UI can pre-resolve a doctor.
    pub async fn find_doctor(
        &self,
        date: NaiveDate,
        time: TimeOfDay,
        service_ids: &[Uuid],
    ) -> Result<Option<Uuid>, AppointmentError> {
        let services = self.load_services(service_ids).await?;
        let duration = combined_duration(&services);
        self.finder
            .find_available_doctor(date, time, duration, None)
            .await
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.appointments
            .find(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("appointment"))
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.appointments.search(query).await
    }

    fn validate_request(&self, request: &BookAppointmentRequest) -> Result<(), AppointmentError> {
        if request.service_ids.is_empty() {
            return Err(AppointmentError::Validation(
                "at least one service is required".to_string(),
            ));
        }

        let now = Utc::now();
        let today = now.date_naive();
        if request.date < today {
            return Err(AppointmentError::Validation(
                "appointment date must be in the future".to_string(),
            ));
        }
        if request.date == today {
            let wall_clock = TimeOfDay::from_hm(now.hour() as u16, now.minute() as u16)
                .expect("wall-clock time is in range");
            if request.time <= wall_clock {
                return Err(AppointmentError::Validation(
                    "appointment time must be in the future".to_string(),
                ));
            }
        }

        Ok(())
    }

    async fn load_services(
        &self,
        service_ids: &[Uuid],
    ) -> Result<Vec<ServiceRecord>, AppointmentError> {
        let services = self.catalog.services_by_ids(service_ids).await?;
        if services.len() != service_ids.len() {
            return Err(AppointmentError::NotFound("service"));
        }
        Ok(services)
    }

    async fn create(
        &self,
        actor: &Actor,
        request: &BookAppointmentRequest,
        doctor_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        // Staff entries are confirmed on the spot; patient self-service
        // bookings wait for staff confirmation.
        let status = if actor.is_staff() {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id,
            service_ids: request.service_ids.clone(),
            date: request.date,
            time: request.time,
            status,
            reschedule_requested: false,
            requested_date: None,
            requested_time: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.appointments.insert(appointment).await?;

        info!(
            "Appointment {} booked with doctor {} at {} {}",
            created.id, doctor_id, created.date, created.time
        );

        let notification = NotificationMessage {
            recipient_id: created.patient_id,
            kind: NotificationKind::Appointment,
            title: "Appointment booked".to_string(),
            message: match created.status {
                AppointmentStatus::Confirmed => "Your appointment is confirmed.".to_string(),
                _ => "Your appointment request is awaiting confirmation.".to_string(),
            },
        };
        if let Err(err) = self.notifier.notify(notification).await {
            warn!("notification dispatch failed for booking: {:#}", err);
        }

        let entry = AuditRecord {
            action: AuditAction::AppointmentBooked,
            actor_id: actor.id,
            actor_role: actor.role,
            details: json!({
                "appointment_id": created.id,
                "doctor_id": created.doctor_id,
                "patient_id": created.patient_id,
                "date": created.date,
                "time": created.time,
                "status": created.status,
            }),
            ip_address: actor.ip_address.clone(),
        };
        if let Err(err) = self.audit.record(entry).await {
            warn!("audit trail write failed for booking: {:#}", err);
        }

        Ok(created)
    }
}
