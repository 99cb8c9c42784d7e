use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-doctor serialization point for check-then-insert booking sequences.
/// Holding the doctor's lock across the conflict check and the write keeps
/// two concurrent requests for the same doctor from both passing the check.
/// This serializes a single process; a multi-instance deployment still
/// needs a uniqueness constraint in the backing store.
#[derive(Clone, Default)]
pub struct DoctorSlotLocks {
    inner: Arc<StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl DoctorSlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_id: Uuid) -> OwnedMutexGuard<()> {
        let slot_lock = {
            let mut registry = self.inner.lock().expect("doctor lock registry poisoned");
            Arc::clone(
                registry
                    .entry(doctor_id)
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        slot_lock.lock_owned().await
    }
}
