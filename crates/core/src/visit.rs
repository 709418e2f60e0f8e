//! Visit records and the filters used to query them.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use tracker_types::{Location, NonEmptyText};

use crate::constants::DEFAULT_SCAN_TYPE;

/// One persisted scan event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Surrogate id assigned by the store, increasing with insertion order.
    pub id: i64,
    pub patient_id: String,
    pub location: Location,
    /// When the scan logically happened, in the offset the caller supplied.
    pub timestamp: DateTime<FixedOffset>,
    pub scan_type: String,
    /// When the row was written. Always set by the store.
    pub created_at: DateTime<Utc>,
}

/// A visit that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub patient_id: NonEmptyText,
    pub location: Location,
    pub timestamp: DateTime<FixedOffset>,
    pub scan_type: String,
}

impl NewVisit {
    pub fn new(
        patient_id: NonEmptyText,
        location: Location,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            patient_id,
            location,
            timestamp,
            scan_type: DEFAULT_SCAN_TYPE.to_string(),
        }
    }
}

/// Optional restrictions applied by [`crate::store::VisitStore::query_visits`].
///
/// An empty filter matches every visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// Calendar day of the visit's timestamp, in the offset it was recorded with.
    pub date: Option<NaiveDate>,
    /// Exact patient id.
    pub patient_id: Option<String>,
}

impl VisitFilter {
    pub fn matches(&self, visit: &Visit) -> bool {
        if let Some(date) = self.date {
            if visit.timestamp.date_naive() != date {
                return false;
            }
        }
        if let Some(patient_id) = &self.patient_id {
            if &visit.patient_id != patient_id {
                return false;
            }
        }
        true
    }
}
