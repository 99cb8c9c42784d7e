use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use schedule_cell::store::DoctorDirectory;
use schedule_cell::time::TimeOfDay;

use crate::models::AppointmentError;
use crate::services::slots::SlotEngine;

/// Automatic doctor assignment when a booking names no doctor.
#[derive(Clone)]
pub struct DoctorFinder {
    directory: Arc<dyn DoctorDirectory>,
    slots: SlotEngine,
}

impl DoctorFinder {
    pub fn new(directory: Arc<dyn DoctorDirectory>, slots: SlotEngine) -> Self {
        Self { directory, slots }
    }

    /// First doctor, in id order, whose requested slot is free. Scanning
    /// in a fixed order keeps assignment deterministic and testable.
    /// `exclude_appointment_id` lets a reschedule ignore its own booking.
    pub async fn find_available_doctor(
        &self,
        date: NaiveDate,
        start: TimeOfDay,
        duration_minutes: u32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppointmentError> {
        let mut doctors = self.directory.available_doctors().await?;
        doctors.sort_by_key(|doctor| doctor.id);

        for doctor in doctors {
            let taken = self
                .slots
                .is_slot_taken(doctor.id, date, start, duration_minutes, exclude_appointment_id)
                .await?;
            if !taken {
                debug!("Doctor {} is free at {} {}", doctor.id, date, start);
                return Ok(Some(doctor.id));
            }
        }

        debug!("No doctor free at {} {}", date, start);
        Ok(None)
    }
}
