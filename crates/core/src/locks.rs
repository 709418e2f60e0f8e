//! Per-patient serialisation of scan writes.
//!
//! The dedup rule is a read, a conditional delete and an insert. Two scans for one patient
//! must not interleave those steps, while scans for different patients stay independent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async mutexes keyed by patient id.
///
/// Entries only exist while a scan for that patient holds or waits on the lock.
#[derive(Clone, Default)]
pub struct PatientLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Held for the duration of one patient's scan. Dropping it releases the lock.
pub struct PatientGuard {
    patient_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: PatientLocks,
}

impl PatientLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `patient_id`.
    pub async fn acquire(&self, patient_id: &str) -> PatientGuard {
        let lock = {
            let mut table = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            table
                .entry(patient_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = lock.lock_owned().await;
        PatientGuard {
            patient_id: patient_id.to_string(),
            guard: Some(guard),
            locks: self.clone(),
        }
    }

    /// Number of patients with a scan in flight.
    pub fn active(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for PatientGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.locks.inner.lock().unwrap_or_else(|e| e.into_inner());
        // One reference is the table's own; anything more is a waiter.
        let idle = table
            .get(&self.patient_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            table.remove(&self.patient_id);
        }
    }
}
