pub mod booking;
pub mod duration;
pub mod finder;
pub mod lifecycle;
pub mod locks;
pub mod slots;

pub use booking::BookingService;
pub use finder::DoctorFinder;
pub use lifecycle::{LifecycleEvent, LifecycleService};
pub use slots::SlotEngine;
