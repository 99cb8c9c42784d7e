use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use schedule_cell::models::{
    CreateWeeklyScheduleRequest, DayOfWeek, ScheduleError, UpsertCalendarDayRequest,
};
use schedule_cell::services::ScheduleService;
use schedule_cell::testing::{InMemoryDoctorDirectory, InMemoryScheduleStore, RecordingAuditTrail};
use schedule_cell::time::TimeOfDay;
use shared_models::auth::{Actor, ActorRole};

fn staff_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: ActorRole::Staff,
        ip_address: None,
    }
}

fn time(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

fn service_with(store: InMemoryScheduleStore, doctor_id: Uuid) -> ScheduleService {
    ScheduleService::new(
        Arc::new(store),
        Arc::new(InMemoryDoctorDirectory::single(doctor_id)),
        Arc::new(RecordingAuditTrail::default()),
    )
}

#[tokio::test]
async fn unconfigured_calendar_falls_back_to_default_week() {
    let service = service_with(InMemoryScheduleStore::new(), Uuid::new_v4());

    let tuesday = service.calendar_for(DayOfWeek::Tuesday).await.unwrap();
    assert!(tuesday.is_open);
    assert_eq!(tuesday.start_time, time("09:00"));
    assert_eq!(tuesday.end_time, time("18:00"));
    assert_eq!(tuesday.break_start_time, Some(time("12:00")));
    assert_eq!(tuesday.break_end_time, Some(time("13:00")));

    let sunday = service.calendar_for(DayOfWeek::Sunday).await.unwrap();
    assert!(!sunday.is_open);
}

#[tokio::test]
async fn calendar_week_lists_all_seven_days_in_order() {
    let service = service_with(InMemoryScheduleStore::new(), Uuid::new_v4());

    let week = service.calendar_week().await.unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].day_of_week, DayOfWeek::Monday);
    assert_eq!(week[6].day_of_week, DayOfWeek::Sunday);
}

#[tokio::test]
async fn set_calendar_day_rejects_inverted_hours() {
    let service = service_with(InMemoryScheduleStore::new(), Uuid::new_v4());

    let result = service
        .set_calendar_day(
            &staff_actor(),
            DayOfWeek::Monday,
            UpsertCalendarDayRequest {
                start_time: Some(time("18:00")),
                end_time: Some(time("09:00")),
                ..Default::default()
            },
        )
        .await;

    assert_matches!(result, Err(ScheduleError::Validation(_)));
}

#[tokio::test]
async fn set_calendar_day_merges_over_defaults() {
    let service = service_with(InMemoryScheduleStore::new(), Uuid::new_v4());

    let updated = service
        .set_calendar_day(
            &staff_actor(),
            DayOfWeek::Saturday,
            UpsertCalendarDayRequest {
                end_time: Some(time("14:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Only the closing time changes; the rest comes from the default week.
    assert!(updated.is_open);
    assert_eq!(updated.start_time, time("09:00"));
    assert_eq!(updated.end_time, time("14:00"));
    assert_eq!(updated.break_start_time, Some(time("12:00")));
}

#[tokio::test]
async fn weekly_entry_rejects_overlap_with_existing_window() {
    let doctor_id = Uuid::new_v4();
    let store =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "13:00");
    let service = service_with(store, doctor_id);

    let result = service
        .add_weekly_entry(
            &staff_actor(),
            doctor_id,
            CreateWeeklyScheduleRequest {
                day_of_week: DayOfWeek::Monday,
                start_time: time("12:00"),
                end_time: time("16:00"),
            },
        )
        .await;

    assert_matches!(result, Err(ScheduleError::Conflict(_)));
}

#[tokio::test]
async fn weekly_entry_allows_touching_windows() {
    let doctor_id = Uuid::new_v4();
    let store =
        InMemoryScheduleStore::new().with_entry(doctor_id, DayOfWeek::Monday, "09:00", "13:00");
    let service = service_with(store, doctor_id);

    let created = service
        .add_weekly_entry(
            &staff_actor(),
            doctor_id,
            CreateWeeklyScheduleRequest {
                day_of_week: DayOfWeek::Monday,
                start_time: time("13:00"),
                end_time: time("17:00"),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.start_time, time("13:00"));
}

#[tokio::test]
async fn weekly_entry_rejects_inverted_range_and_unknown_doctor() {
    let doctor_id = Uuid::new_v4();
    let service = service_with(InMemoryScheduleStore::new(), doctor_id);

    let inverted = service
        .add_weekly_entry(
            &staff_actor(),
            doctor_id,
            CreateWeeklyScheduleRequest {
                day_of_week: DayOfWeek::Friday,
                start_time: time("15:00"),
                end_time: time("15:00"),
            },
        )
        .await;
    assert_matches!(inverted, Err(ScheduleError::Validation(_)));

    let unknown = service
        .add_weekly_entry(
            &staff_actor(),
            Uuid::new_v4(),
            CreateWeeklyScheduleRequest {
                day_of_week: DayOfWeek::Friday,
                start_time: time("09:00"),
                end_time: time("12:00"),
            },
        )
        .await;
    assert_matches!(unknown, Err(ScheduleError::NotFound("doctor")));
}
