use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::time::TimeOfDay;

// ==============================================================================
// CORE SCHEDULE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            _ => Err(format!("unknown day of week: {raw}")),
        }
    }
}

/// One recurring availability window for a doctor. A doctor may hold several
/// entries per day as long as their time ranges do not overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Clinic-wide operating hours for one weekday. A closed day offers no
/// slots regardless of any doctor's own schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicCalendarDay {
    pub day_of_week: DayOfWeek,
    pub is_open: bool,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub break_start_time: Option<TimeOfDay>,
    pub break_end_time: Option<TimeOfDay>,
}

impl ClinicCalendarDay {
    /// The built-in week used when no calendar has been configured:
    /// Monday through Saturday 09:00-18:00 with a 12:00-13:00 break,
    /// Sunday closed.
    pub fn default_for(day: DayOfWeek) -> Self {
        let is_open = day != DayOfWeek::Sunday;
        ClinicCalendarDay {
            day_of_week: day,
            is_open,
            start_time: TimeOfDay::from_hm(9, 0).expect("valid default opening time"),
            end_time: TimeOfDay::from_hm(18, 0).expect("valid default closing time"),
            break_start_time: is_open.then(|| TimeOfDay::from_hm(12, 0)).flatten(),
            break_end_time: is_open.then(|| TimeOfDay::from_hm(13, 0)).flatten(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub is_available: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWeeklyScheduleRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Partial update for one calendar day; absent fields keep their current
/// (or default) values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertCalendarDayRequest {
    pub is_open: Option<bool>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub break_start_time: Option<TimeOfDay>,
    pub break_end_time: Option<TimeOfDay>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("schedule conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("schedule store failure: {0}")]
    Store(String),
}
