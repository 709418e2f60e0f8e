//! Request-level operations over a [`crate::store::VisitStore`].
//!
//! Services hold no per-request state; they are cheap to clone and share between handlers.

pub mod report;
pub mod scan;

pub use report::{build_report, FlowStep, ReportService, VisitReport};
pub use scan::{ScanInput, ScanService};
