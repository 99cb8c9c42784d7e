mod common;

use uuid::Uuid;

use appointment_cell::models::AppointmentStatus;
use appointment_cell::testing::{InMemoryAppointmentStore, StaticServiceCatalog};
use schedule_cell::models::{ClinicCalendarDay, DayOfWeek};
use schedule_cell::testing::InMemoryScheduleStore;

use common::{appointment, build_cell, doctor, monday, sunday, time};

fn open_monday_without_break() -> ClinicCalendarDay {
    ClinicCalendarDay {
        day_of_week: DayOfWeek::Monday,
        is_open: true,
        start_time: time("08:00"),
        end_time: time("20:00"),
        break_start_time: None,
        break_end_time: None,
    }
}

#[tokio::test]
async fn morning_window_with_one_booking_yields_expected_slots() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule = InMemoryScheduleStore::new()
        .with_entry(doctor_id, DayOfWeek::Monday, "09:00", "12:00")
        .with_calendar_day(open_monday_without_break());
    let appointments = InMemoryAppointmentStore::new().with_appointment(appointment(
        doctor_id,
        monday(),
        "09:00",
        vec![cleaning],
        AppointmentStatus::Confirmed,
    ));
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));

    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    let slots = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();

    let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "09:30", "09:45", "10:00", "10:15", "10:30", "10:45", "11:00", "11:15", "11:30"
        ]
    );
}

#[tokio::test]
async fn no_slot_touches_or_spans_the_break_window() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    // Default calendar: Monday 09:00-18:00 with a 12:00-13:00 break.
    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "18:00");
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));

    let cell = build_cell(
        schedule,
        vec![doctor(doctor_id)],
        InMemoryAppointmentStore::new(),
        catalog,
    );

    let slots = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();
    let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();

    // A slot ending exactly at break start already conflicts, as does one
    // starting exactly at break end.
    assert!(rendered.contains(&"11:15".to_string()));
    assert!(!rendered.contains(&"11:30".to_string()));
    assert!(!rendered.contains(&"12:00".to_string()));
    assert!(!rendered.contains(&"12:30".to_string()));
    assert!(!rendered.contains(&"13:00".to_string()));
    assert!(rendered.contains(&"13:15".to_string()));
}

#[tokio::test]
async fn closed_day_and_missing_window_yield_no_slots() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Sunday, "09:00", "18:00");
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(
        schedule,
        vec![doctor(doctor_id)],
        InMemoryAppointmentStore::new(),
        catalog,
    );

    // Sunday is closed by default even though the doctor has a window.
    let closed = cell
        .booking
        .available_slots(doctor_id, sunday(), &[cleaning])
        .await
        .unwrap();
    assert!(closed.is_empty());

    // Monday is open but this doctor has no Monday window.
    let no_window = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();
    assert!(no_window.is_empty());
}

#[tokio::test]
async fn available_slots_is_idempotent_without_new_bookings() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "12:00");
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));
    let cell = build_cell(
        schedule,
        vec![doctor(doctor_id)],
        InMemoryAppointmentStore::new(),
        catalog,
    );

    let first = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();
    let second = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn cancelled_appointments_do_not_occupy_slots() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);

    let schedule = InMemoryScheduleStore::new()
        .with_entry(doctor_id, DayOfWeek::Monday, "09:00", "12:00")
        .with_calendar_day(open_monday_without_break());
    let appointments = InMemoryAppointmentStore::new().with_appointment(appointment(
        doctor_id,
        monday(),
        "09:00",
        vec![cleaning],
        AppointmentStatus::Cancelled,
    ));
    let catalog = StaticServiceCatalog::new().with_service(cleaning, "Teeth Cleaning", Some(30.0));

    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    let slots = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();

    assert_eq!(slots.first().map(ToString::to_string).as_deref(), Some("09:00"));
}

#[tokio::test]
async fn blocking_interval_length_comes_from_the_booked_services() {
    let doctor_id = Uuid::from_u128(1);
    let cleaning = Uuid::from_u128(10);
    let root_canal = Uuid::from_u128(11);

    let schedule = InMemoryScheduleStore::new()
        .with_entry(doctor_id, DayOfWeek::Monday, "09:00", "12:00")
        .with_calendar_day(open_monday_without_break());
    // The existing booking is a 90-minute root canal, resolved from the
    // catalog rather than assumed to be a standard visit.
    let appointments = InMemoryAppointmentStore::new().with_appointment(appointment(
        doctor_id,
        monday(),
        "09:00",
        vec![root_canal],
        AppointmentStatus::Confirmed,
    ));
    let catalog = StaticServiceCatalog::new()
        .with_service(cleaning, "Teeth Cleaning", Some(30.0))
        .with_service(root_canal, "Root Canal Treatment", None);

    let cell = build_cell(schedule, vec![doctor(doctor_id)], appointments, catalog);

    let slots = cell
        .booking
        .available_slots(doctor_id, monday(), &[cleaning])
        .await
        .unwrap();

    // Blocked until 10:30, when the root canal ends; back-to-back is fine.
    assert_eq!(slots.first().map(ToString::to_string).as_deref(), Some("10:30"));
}
