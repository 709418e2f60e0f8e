//! # API Shared
//!
//! Shared definitions for the tracker's outer surfaces.
//!
//! Contains:
//! - JSON request/response bodies with OpenAPI schemas (`dto` module)
//! - Conversions from core domain types to wire types
//! - `HealthService`, used by both the REST API and the CLI

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::{HealthRes, HealthService};
