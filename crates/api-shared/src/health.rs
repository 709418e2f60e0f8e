use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracker_core::VisitStore;
use utoipa::ToSchema;

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "connected")]
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthRes {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health service usable by the REST API and the CLI
///
/// Probes the visit store and reports the outcome. A failed probe is a result, never an error.
pub struct HealthService;

impl HealthService {
    /// Probe `store` and describe the outcome.
    ///
    /// # Returns
    /// A `HealthRes` with `status: "healthy"` / `database: "connected"` when the probe
    /// succeeds, otherwise `status: "unhealthy"` / `database: "disconnected"`.
    pub async fn check_health(store: &dyn VisitStore) -> HealthRes {
        match store.ping().await {
            Ok(()) => HealthRes {
                status: "healthy".into(),
                database: "connected".into(),
                timestamp: Utc::now(),
            },
            Err(e) => {
                tracing::warn!("Health probe failed: {}", e);
                HealthRes {
                    status: "unhealthy".into(),
                    database: "disconnected".into(),
                    timestamp: Utc::now(),
                }
            }
        }
    }
}
