use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_core::{CoreConfig, SqliteVisitStore, VisitStore};

/// Main entry point for the hospital time tracker
///
/// Resolves configuration, opens the visit store (creating the schema if needed) and serves
/// the REST API.
///
/// # Environment Variables
/// - `TRACKER_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DATABASE_URL`: visit store URL (default: "sqlite:hospital_tracker.db?mode=rwc")
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the database cannot be opened, or
/// - the HTTP server fails to bind or while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tracker_run=info".parse()?)
                .add_directive("tracker_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var("TRACKER_REST_ADDR").ok(),
        std::env::var("DATABASE_URL").ok(),
        std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
    )?;

    tracing::info!("++ Starting hospital time tracker on {}", cfg.rest_addr());

    let store: Arc<dyn VisitStore> = match SqliteVisitStore::connect(&cfg).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open visit store {}: {}", cfg.database_url(), e);
            return Err(e.into());
        }
    };

    api_rest::serve(&cfg, store).await
}
