//! Visit storage abstraction.
//!
//! Services only ever talk to a [`VisitStore`]; the concrete backend is picked at startup.
//! [`SqliteVisitStore`] is the production binding and [`MemoryVisitStore`] keeps everything
//! in process.

use async_trait::async_trait;

use crate::visit::{NewVisit, Visit, VisitFilter};
use crate::TrackerResult;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryVisitStore;
pub use sqlite::SqliteVisitStore;

/// Persistence operations needed by the scan, report and health paths.
///
/// Every failure is reported as [`crate::TrackerError::StorageUnavailable`].
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// The patient's most recent visit by timestamp. Ties go to the highest id.
    async fn latest_visit(&self, patient_id: &str) -> TrackerResult<Option<Visit>>;

    /// Delete a visit by id. Returns whether a row was removed.
    async fn delete_visit(&self, id: i64) -> TrackerResult<bool>;

    /// Insert a visit, assigning its id and `created_at`.
    async fn insert_visit(&self, visit: NewVisit) -> TrackerResult<Visit>;

    /// Visits matching `filter`, ascending by timestamp then id.
    async fn query_visits(&self, filter: &VisitFilter) -> TrackerResult<Vec<Visit>>;

    /// Lightweight connectivity probe.
    async fn ping(&self) -> TrackerResult<()>;
}
