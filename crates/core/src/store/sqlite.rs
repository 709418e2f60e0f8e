//! SQLite implementation of [`VisitStore`].
//!
//! Timestamps are written twice: `timestamp` keeps the RFC 3339 text with the caller's offset
//! (so the calendar day can be read straight off the first ten characters) and
//! `timestamp_us` holds UTC epoch microseconds for ordering.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;
use tracker_types::Location;

use super::VisitStore;
use crate::config::CoreConfig;
use crate::visit::{NewVisit, Visit, VisitFilter};
use crate::{TrackerError, TrackerResult};

const SELECT_VISITS: &str =
    "SELECT id, patient_id, location, timestamp, scan_type, created_at FROM visits";

/// SQLite-backed visit store.
#[derive(Clone)]
pub struct SqliteVisitStore {
    pool: SqlitePool,
}

impl SqliteVisitStore {
    /// Connect using the configured URL and pool size, then make sure the schema exists.
    pub async fn connect(cfg: &CoreConfig) -> TrackerResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections())
            .connect(cfg.database_url())
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

        let store = Self { pool };
        store.initialize_tables().await?;
        info!("Connected to visit store at {}", cfg.database_url());
        Ok(store)
    }

    /// A private in-memory database.
    ///
    /// Uses a single connection: every SQLite `:memory:` connection is its own database.
    pub async fn in_memory() -> TrackerResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize_tables().await?;
        Ok(store)
    }

    /// Close every pooled connection. Later operations fail with `StorageUnavailable`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create the visits table and its indexes if they don't exist.
    pub async fn initialize_tables(&self) -> TrackerResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id VARCHAR(255) NOT NULL,
                location VARCHAR(50) NOT NULL,
                timestamp TEXT NOT NULL,
                timestamp_us INTEGER NOT NULL,
                scan_type VARCHAR(20) NOT NULL DEFAULT 'normal',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_visits_patient_id ON visits (patient_id)",
            "CREATE INDEX IF NOT EXISTS idx_visits_location ON visits (location)",
            "CREATE INDEX IF NOT EXISTS idx_visits_timestamp ON visits (timestamp_us)",
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        Ok(())
    }
}

fn visit_from_row(row: &SqliteRow) -> TrackerResult<Visit> {
    let location: String = row.try_get("location")?;
    let timestamp: String = row.try_get("timestamp")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Visit {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        location: location
            .parse::<Location>()
            .map_err(TrackerError::storage)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp).map_err(TrackerError::storage)?,
        scan_type: row.try_get("scan_type")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(TrackerError::storage)?
            .with_timezone(&Utc),
    })
}

#[async_trait]
impl VisitStore for SqliteVisitStore {
    async fn latest_visit(&self, patient_id: &str) -> TrackerResult<Option<Visit>> {
        let row = sqlx::query(&format!(
            "{SELECT_VISITS} WHERE patient_id = ? ORDER BY timestamp_us DESC, id DESC LIMIT 1"
        ))
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(visit_from_row).transpose()
    }

    async fn delete_visit(&self, id: i64) -> TrackerResult<bool> {
        let result = sqlx::query("DELETE FROM visits WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_visit(&self, visit: NewVisit) -> TrackerResult<Visit> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO visits (patient_id, location, timestamp, timestamp_us, scan_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(visit.patient_id.as_str())
        .bind(visit.location.as_str())
        .bind(visit.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        .bind(visit.timestamp.timestamp_micros())
        .bind(&visit.scan_type)
        .bind(created_at.to_rfc3339_opts(SecondsFormat::Micros, false))
        .execute(&self.pool)
        .await?;

        Ok(Visit {
            id: result.last_insert_rowid(),
            patient_id: visit.patient_id.into_inner(),
            location: visit.location,
            timestamp: visit.timestamp,
            scan_type: visit.scan_type,
            created_at,
        })
    }

    async fn query_visits(&self, filter: &VisitFilter) -> TrackerResult<Vec<Visit>> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_VISITS);
        query.push(" WHERE 1 = 1");

        if let Some(date) = filter.date {
            query
                .push(" AND substr(timestamp, 1, 10) = ")
                .push_bind(date.format("%Y-%m-%d").to_string());
        }
        if let Some(patient_id) = &filter.patient_id {
            query.push(" AND patient_id = ").push_bind(patient_id.clone());
        }
        query.push(" ORDER BY timestamp_us ASC, id ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(visit_from_row).collect()
    }

    async fn ping(&self) -> TrackerResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
