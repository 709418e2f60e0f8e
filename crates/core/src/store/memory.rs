//! In-process visit store.
//!
//! Backs tests and local experiments. Data lives for as long as the store does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::VisitStore;
use crate::visit::{NewVisit, Visit, VisitFilter};
use crate::{TrackerError, TrackerResult};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    visits: Vec<Visit>,
}

/// A [`VisitStore`] holding visits in a vector behind a mutex.
pub struct MemoryVisitStore {
    state: Mutex<MemoryState>,
    available: AtomicBool,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated availability. While unavailable every operation fails with
    /// `StorageUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn lock(&self) -> TrackerResult<MutexGuard<'_, MemoryState>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(TrackerError::storage("in-memory store is offline"));
        }
        self.state
            .lock()
            .map_err(|_| TrackerError::storage("in-memory store lock poisoned"))
    }
}

impl Default for MemoryVisitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisitStore for MemoryVisitStore {
    async fn latest_visit(&self, patient_id: &str) -> TrackerResult<Option<Visit>> {
        let state = self.lock()?;
        Ok(state
            .visits
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .max_by_key(|v| (v.timestamp, v.id))
            .cloned())
    }

    async fn delete_visit(&self, id: i64) -> TrackerResult<bool> {
        let mut state = self.lock()?;
        let before = state.visits.len();
        state.visits.retain(|v| v.id != id);
        Ok(state.visits.len() != before)
    }

    async fn insert_visit(&self, visit: NewVisit) -> TrackerResult<Visit> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let stored = Visit {
            id: state.next_id,
            patient_id: visit.patient_id.into_inner(),
            location: visit.location,
            timestamp: visit.timestamp,
            scan_type: visit.scan_type,
            created_at: Utc::now(),
        };
        state.visits.push(stored.clone());
        Ok(stored)
    }

    async fn query_visits(&self, filter: &VisitFilter) -> TrackerResult<Vec<Visit>> {
        let state = self.lock()?;
        let mut visits: Vec<Visit> = state
            .visits
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        visits.sort_by_key(|v| (v.timestamp, v.id));
        Ok(visits)
    }

    async fn ping(&self) -> TrackerResult<()> {
        self.lock().map(|_| ())
    }
}
