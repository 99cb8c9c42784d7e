//! Shared fixtures for the appointment-cell integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc, Weekday};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::testing::{InMemoryAppointmentStore, StaticServiceCatalog};
use appointment_cell::AppointmentCell;
use schedule_cell::models::Doctor;
use schedule_cell::testing::{
    InMemoryDoctorDirectory, InMemoryScheduleStore, RecordingAuditTrail,
};
use schedule_cell::time::TimeOfDay;
use shared_models::auth::{Actor, ActorRole};

pub const GRANULARITY: u16 = 15;

/// A Monday comfortably in the future so booking validation passes.
pub fn monday() -> NaiveDate {
    NaiveDate::from_isoywd_opt(2030, 23, Weekday::Mon).unwrap()
}

pub fn sunday() -> NaiveDate {
    NaiveDate::from_isoywd_opt(2030, 23, Weekday::Sun).unwrap()
}

pub fn time(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

pub fn staff() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: ActorRole::Staff,
        ip_address: None,
    }
}

pub fn patient(id: Uuid) -> Actor {
    Actor {
        id,
        role: ActorRole::Patient,
        ip_address: None,
    }
}

pub fn doctor(id: Uuid) -> Doctor {
    Doctor {
        id,
        full_name: format!("Dr. {id}"),
        is_available: true,
    }
}

pub fn appointment(
    doctor_id: Uuid,
    date: NaiveDate,
    start: &str,
    service_ids: Vec<Uuid>,
    status: AppointmentStatus,
) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id,
        service_ids,
        date,
        time: time(start),
        status,
        reschedule_requested: false,
        requested_date: None,
        requested_time: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn build_cell(
    schedule: InMemoryScheduleStore,
    doctors: Vec<Doctor>,
    appointments: InMemoryAppointmentStore,
    catalog: StaticServiceCatalog,
) -> AppointmentCell {
    AppointmentCell::new(
        Arc::new(schedule),
        Arc::new(InMemoryDoctorDirectory::new(doctors)),
        Arc::new(appointments),
        Arc::new(catalog),
        Arc::new(appointment_cell::testing::RecordingNotifier::default()),
        Arc::new(RecordingAuditTrail::default()),
        GRANULARITY,
    )
}
