//! In-memory store fixtures for deterministic tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared_models::sinks::{NotificationMessage, Notifier};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, DurationSpec, ServiceRecord,
};
use crate::store::{AppointmentStore, ServiceCatalog};

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointment(self, appointment: Appointment) -> Self {
        self.appointments
            .write()
            .expect("appointment fixture lock")
            .push(appointment);
        self
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self
            .appointments
            .read()
            .expect("appointment fixture lock")
            .iter()
            .find(|appointment| appointment.id == appointment_id)
            .cloned())
    }

    async fn for_doctor_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .appointments
            .read()
            .expect("appointment fixture lock")
            .iter()
            .filter(|appointment| {
                appointment.doctor_id == doctor_id && appointment.date == date
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        self.appointments
            .write()
            .expect("appointment fixture lock")
            .push(appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.write().expect("appointment fixture lock");
        let stored = appointments
            .iter_mut()
            .find(|stored| stored.id == appointment.id)
            .ok_or(AppointmentError::NotFound("appointment"))?;
        *stored = appointment.clone();
        Ok(appointment)
    }

    async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .appointments
            .read()
            .expect("appointment fixture lock")
            .iter()
            .filter(|appointment| {
                query
                    .patient_id
                    .map_or(true, |patient_id| appointment.patient_id == patient_id)
                    && query
                        .doctor_id
                        .map_or(true, |doctor_id| appointment.doctor_id == doctor_id)
                    && query.date.map_or(true, |date| appointment.date == date)
                    && query.status.map_or(true, |status| appointment.status == status)
            })
            .cloned()
            .collect())
    }
}

/// Fixed service catalog keyed by id.
#[derive(Default)]
pub struct StaticServiceCatalog {
    services: HashMap<Uuid, ServiceRecord>,
}

impl StaticServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, id: Uuid, name: &str, minutes: Option<f64>) -> Self {
        self.services.insert(
            id,
            ServiceRecord {
                id,
                name: name.to_string(),
                duration: minutes.map(DurationSpec::Minutes),
            },
        );
        self
    }
}

#[async_trait]
impl ServiceCatalog for StaticServiceCatalog {
    async fn services_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ServiceRecord>, AppointmentError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.services.get(id).cloned())
            .collect())
    }
}

/// Notifier that remembers what it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RwLock<Vec<NotificationMessage>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: NotificationMessage) -> anyhow::Result<()> {
        self.sent.write().expect("notifier fixture lock").push(message);
        Ok(())
    }
}

/// Notifier that always fails; transitions must survive it.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _message: NotificationMessage) -> anyhow::Result<()> {
        anyhow::bail!("notification service unreachable")
    }
}
