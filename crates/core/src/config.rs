//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and the
//! server. Nothing in this crate reads process-wide environment variables while handling a
//! request.

use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS, DEFAULT_REST_ADDR};
use crate::{TrackerError, TrackerResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: String,
    database_url: String,
    max_connections: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        rest_addr: String,
        database_url: String,
        max_connections: u32,
    ) -> TrackerResult<Self> {
        if rest_addr.trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "rest_addr cannot be empty".into(),
            ));
        }
        if database_url.trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "database_url cannot be empty".into(),
            ));
        }
        if max_connections == 0 {
            return Err(TrackerError::InvalidConfig(
                "max_connections must be at least 1".into(),
            ));
        }

        Ok(Self {
            rest_addr,
            database_url,
            max_connections,
        })
    }

    /// Build a config from optional raw values, falling back to defaults for anything unset.
    ///
    /// Intended to be fed straight from `std::env::var(..).ok()` in a binary's `main`.
    pub fn from_env_values(
        rest_addr: Option<String>,
        database_url: Option<String>,
        max_connections: Option<String>,
    ) -> TrackerResult<Self> {
        Self::new(
            non_blank(rest_addr).unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            non_blank(database_url).unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            max_connections_from_env_value(max_connections)?,
        )
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Parse the pool size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_CONNECTIONS`].
pub fn max_connections_from_env_value(value: Option<String>) -> TrackerResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(v) => v.parse::<u32>().map_err(|_| {
            TrackerError::InvalidConfig(format!(
                "DATABASE_MAX_CONNECTIONS must be a positive integer, got {v:?}"
            ))
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
