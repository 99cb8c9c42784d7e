mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentError, AppointmentStatus, RescheduleProposalRequest,
};
use appointment_cell::services::LifecycleEvent;
use appointment_cell::testing::{
    FailingNotifier, InMemoryAppointmentStore, StaticServiceCatalog,
};
use appointment_cell::AppointmentCell;
use schedule_cell::models::DayOfWeek;
use schedule_cell::testing::{
    InMemoryDoctorDirectory, InMemoryScheduleStore, RecordingAuditTrail,
};

use common::{appointment, build_cell, doctor, monday, patient, staff, time, GRANULARITY};

#[tokio::test]
async fn approved_cancellation_frees_the_slot() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::Confirmed,
    );
    let booked_id = booked.id;
    let owner = patient(booked.patient_id);
    let appointments = InMemoryAppointmentStore::new().with_appointment(booked);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    cell.lifecycle
        .apply_event(&owner, booked_id, LifecycleEvent::RequestCancellation)
        .await
        .unwrap();

    let cancelled = cell
        .lifecycle
        .apply_event(&staff(), booked_id, LifecycleEvent::ApproveCancellation)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    // The former slot no longer blocks new bookings.
    let chosen = cell
        .booking
        .find_doctor(monday(), time("10:00"), &[cleaning])
        .await
        .unwrap();
    assert_eq!(chosen, Some(doctor_id));
}

#[tokio::test]
async fn rejected_cancellation_keeps_the_slot_occupied() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::CancellationRequested,
    );
    let booked_id = booked.id;
    let appointments = InMemoryAppointmentStore::new().with_appointment(booked);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    let kept = cell
        .lifecycle
        .apply_event(&staff(), booked_id, LifecycleEvent::RejectCancellation)
        .await
        .unwrap();
    assert_eq!(kept.status, AppointmentStatus::Confirmed);

    let chosen = cell
        .booking
        .find_doctor(monday(), time("10:00"), &[cleaning])
        .await
        .unwrap();
    assert_eq!(chosen, None);
}

#[tokio::test]
async fn reschedule_approval_moves_the_booking_and_clears_the_flag() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::Confirmed,
    );
    let booked_id = booked.id;
    let owner = patient(booked.patient_id);
    let appointments = InMemoryAppointmentStore::new().with_appointment(booked);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    cell.lifecycle
        .request_reschedule(
            &owner,
            booked_id,
            RescheduleProposalRequest {
                new_date: monday(),
                new_time: time("15:00"),
            },
        )
        .await
        .unwrap();

    let moved = cell
        .lifecycle
        .approve_reschedule(&staff(), booked_id)
        .await
        .unwrap();

    assert_eq!(moved.status, AppointmentStatus::Confirmed);
    assert_eq!(moved.time, time("15:00"));
    assert!(!moved.reschedule_requested);
    assert_eq!(moved.requested_date, None);
    assert_eq!(moved.requested_time, None);
}

#[tokio::test]
async fn reschedule_into_an_occupied_slot_is_rejected_and_leaves_the_original() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::Confirmed,
    );
    let blocker = appointment(
        doctor_id,
        monday(),
        "15:00",
        vec![cleaning],
        AppointmentStatus::Confirmed,
    );
    let booked_id = booked.id;
    let owner = patient(booked.patient_id);
    let appointments = InMemoryAppointmentStore::new()
        .with_appointment(booked)
        .with_appointment(blocker);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    cell.lifecycle
        .request_reschedule(
            &owner,
            booked_id,
            RescheduleProposalRequest {
                new_date: monday(),
                new_time: time("15:00"),
            },
        )
        .await
        .unwrap();

    let result = cell.lifecycle.approve_reschedule(&staff(), booked_id).await;
    assert_matches!(result, Err(AppointmentError::Conflict(_)));

    // Original booking and its proposal survive the failed approval.
    let unchanged = cell.booking.get_appointment(booked_id).await.unwrap();
    assert_eq!(unchanged.time, time("10:00"));
    assert_eq!(unchanged.status, AppointmentStatus::Confirmed);
    assert!(unchanged.reschedule_requested);

    // And the original slot still blocks other bookings.
    let chosen = cell
        .booking
        .find_doctor(monday(), time("10:00"), &[cleaning])
        .await
        .unwrap();
    assert_eq!(chosen, None);
}

#[tokio::test]
async fn reschedule_request_requires_a_confirmed_appointment() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::Pending,
    );
    let booked_id = booked.id;
    let owner = patient(booked.patient_id);
    let appointments = InMemoryAppointmentStore::new().with_appointment(booked);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    let result = cell
        .lifecycle
        .request_reschedule(
            &owner,
            booked_id,
            RescheduleProposalRequest {
                new_date: monday(),
                new_time: time("15:00"),
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::InvalidTransition { .. }));
}

#[tokio::test]
async fn transitions_survive_a_failing_notification_sink() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let booked = appointment(
        doctor_id,
        monday(),
        "10:00",
        vec![cleaning],
        AppointmentStatus::Pending,
    );
    let booked_id = booked.id;
    let appointments = InMemoryAppointmentStore::new().with_appointment(booked);
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));

    let cell = AppointmentCell::new(
        Arc::new(schedule),
        Arc::new(InMemoryDoctorDirectory::single(doctor_id)),
        Arc::new(appointments),
        Arc::new(catalog),
        Arc::new(FailingNotifier),
        Arc::new(RecordingAuditTrail::default()),
        GRANULARITY,
    );

    let confirmed = cell
        .lifecycle
        .apply_event(&staff(), booked_id, LifecycleEvent::Confirm)
        .await
        .unwrap();

    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}
