//! # Tracker Core
//!
//! Core business logic for the hospital time tracker.
//!
//! This crate contains the data operations behind patient location scans:
//! - Validation of raw scan input
//! - The consecutive-scan dedup rule, serialised per patient
//! - Report building (time-ordered visits grouped into patient flows)
//! - The [`store::VisitStore`] abstraction and its SQLite binding
//!
//! **No API concerns**: HTTP servers, wire formats and health endpoints belong in `api-rest`
//! or `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod locks;
pub mod services;
pub mod store;
pub mod validation;
pub mod visit;

pub use config::CoreConfig;
pub use error::{TrackerError, TrackerResult, ValidationError};
pub use services::{build_report, FlowStep, ReportService, ScanInput, ScanService, VisitReport};
pub use store::{MemoryVisitStore, SqliteVisitStore, VisitStore};
pub use tracker_types::{Location, NonEmptyText};
pub use visit::{NewVisit, Visit, VisitFilter};
