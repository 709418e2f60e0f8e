//! Constants used throughout the tracker core crate.

/// Default listen address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default database URL when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:hospital_tracker.db?mode=rwc";

/// Default size of the storage connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Scan type recorded when the caller does not classify the scan.
pub const DEFAULT_SCAN_TYPE: &str = "normal";
