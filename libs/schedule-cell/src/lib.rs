pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;
pub mod testing;
pub mod time;

pub use models::{ClinicCalendarDay, DayOfWeek, Doctor, ScheduleError, WeeklySchedule};
pub use services::ScheduleService;
pub use store::{DoctorDirectory, ScheduleStore};
pub use time::TimeOfDay;
