pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;
pub mod testing;

use std::sync::Arc;

use schedule_cell::store::{DoctorDirectory, ScheduleStore};
use shared_models::sinks::{AuditTrail, Notifier};

use services::locks::DoctorSlotLocks;
use services::{BookingService, DoctorFinder, LifecycleService, SlotEngine};
use store::{AppointmentStore, ServiceCatalog};

pub use models::{Appointment, AppointmentError, AppointmentStatus, ServiceRecord};

/// Everything the appointment routes need, wired once at startup. The
/// booking and lifecycle services share one lock registry so every
/// check-then-write path for a doctor serializes through the same mutex.
pub struct AppointmentCell {
    pub booking: BookingService,
    pub lifecycle: LifecycleService,
}

impl AppointmentCell {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        directory: Arc<dyn DoctorDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditTrail>,
        slot_granularity_minutes: u16,
    ) -> Self {
        let slots = SlotEngine::new(
            schedules,
            Arc::clone(&appointments),
            Arc::clone(&catalog),
            slot_granularity_minutes,
        );
        let finder = DoctorFinder::new(Arc::clone(&directory), slots.clone());
        let locks = DoctorSlotLocks::new();

        let booking = BookingService::new(
            Arc::clone(&appointments),
            Arc::clone(&catalog),
            directory,
            slots.clone(),
            finder,
            locks.clone(),
            Arc::clone(&notifier),
            Arc::clone(&audit),
        );
        let lifecycle = LifecycleService::new(appointments, catalog, slots, locks, notifier, audit);

        Self { booking, lifecycle }
    }
}
