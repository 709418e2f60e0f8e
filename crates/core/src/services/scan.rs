//! Recording patient scans.
//!
//! A scan at the same location as the patient's most recent visit replaces that visit, so a
//! patient lingering at one QR reader leaves a single row carrying the latest timestamp. A
//! return to an earlier location after going somewhere else is a new visit.

use std::sync::Arc;

use tracing::{debug, info};

use crate::locks::PatientLocks;
use crate::store::VisitStore;
use crate::validation::{now_utc, validate_scan};
use crate::visit::Visit;
use crate::TrackerResult;

/// Raw scan fields as received from a client. Missing fields are `None`.
#[derive(Debug, Clone, Default)]
pub struct ScanInput {
    pub patient_id: Option<String>,
    pub location: Option<String>,
    pub timestamp: Option<String>,
}

impl ScanInput {
    pub fn new(patient_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            location: Some(location.into()),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Validates scans and applies the dedup rule before writing.
#[derive(Clone)]
pub struct ScanService {
    store: Arc<dyn VisitStore>,
    locks: PatientLocks,
}

impl ScanService {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self {
            store,
            locks: PatientLocks::new(),
        }
    }

    /// Record one scan and return the stored visit.
    ///
    /// Scans for the same patient are processed one at a time.
    ///
    /// # Errors
    ///
    /// - `TrackerError::Validation` for bad input; the store is not touched.
    /// - `TrackerError::StorageUnavailable` if any store call fails. Nothing is retried, so a
    ///   failed insert after a successful delete leaves the previous visit removed.
    pub async fn scan(&self, input: ScanInput) -> TrackerResult<Visit> {
        let new_visit = validate_scan(
            input.patient_id.as_deref(),
            input.location.as_deref(),
            input.timestamp.as_deref(),
            now_utc(),
        )?;

        let _guard = self.locks.acquire(new_visit.patient_id.as_str()).await;

        if let Some(last) = self.store.latest_visit(new_visit.patient_id.as_str()).await? {
            if last.location == new_visit.location {
                debug!(
                    patient_id = %last.patient_id,
                    location = %last.location,
                    replaced_id = last.id,
                    "replacing consecutive scan"
                );
                self.store.delete_visit(last.id).await?;
            }
        }

        let visit = self.store.insert_visit(new_visit).await?;
        info!(
            patient_id = %visit.patient_id,
            location = %visit.location,
            id = visit.id,
            "scan recorded"
        );
        Ok(visit)
    }
}
