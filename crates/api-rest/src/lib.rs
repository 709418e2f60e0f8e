//! # API REST
//!
//! REST API implementation for the hospital time tracker.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `tracker-core` for the operations themselves.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    ErrorRes, FlowStepRes, HealthRes, HealthService, ReportQuery, ReportRes, ScanReq, ScanRes,
    VisitRes,
};
use tracker_core::{CoreConfig, ReportService, ScanService, VisitStore};

mod error;

pub use error::ApiError;

/// Application state shared across REST API handlers
///
/// Holds the scan and report services plus the raw store for health probes. All three share
/// one underlying `VisitStore`.
#[derive(Clone)]
pub struct AppState {
    scans: ScanService,
    reports: ReportService,
    store: Arc<dyn VisitStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self {
            scans: ScanService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            store,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(scan, reports, visits, health),
    components(schemas(
        ScanReq,
        ScanRes,
        ErrorRes,
        VisitRes,
        FlowStepRes,
        ReportRes,
        HealthRes,
    ))
)]
pub struct ApiDoc;

/// Build the router with every endpoint, Swagger UI and a permissive CORS layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/scan", post(scan))
        .route("/api/reports", get(reports))
        .route("/api/visits", get(visits))
        .route("/api/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to the configured address and serve until the process is stopped.
///
/// # Errors
/// Returns an error if:
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(cfg: &CoreConfig, store: Arc<dyn VisitStore>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    tracing::info!("-- Tracker REST API listening on {}", listener.local_addr()?);

    axum::serve(listener, app(AppState::new(store))).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanReq,
    responses(
        (status = 200, description = "Scan recorded", body = ScanRes),
        (status = 400, description = "Invalid QR code, location or timestamp", body = ErrorRes),
        (status = 500, description = "Database unavailable", body = ErrorRes)
    )
)]
/// Record a patient scan
///
/// A scan at the same location as the patient's previous scan replaces it.
///
/// # Errors
/// Returns `400 Bad Request` if the body is malformed, the patient id or location is
/// missing, or the location is unknown. Returns `500 Internal Server Error` if the store
/// cannot be reached.
#[axum::debug_handler]
async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanReq>, JsonRejection>,
) -> Result<Json<ScanRes>, ApiError> {
    let Json(req) = payload?;
    let visit = state.scans.scan(req.into()).await?;
    Ok(Json(ScanRes::from(&visit)))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Visits and per-patient flows", body = ReportRes),
        (status = 500, description = "Database unavailable", body = ErrorRes)
    )
)]
/// Aggregated visit report
///
/// Optional `date` and `patient_id` filters. An unparsable date is ignored.
#[axum::debug_handler]
async fn reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportRes>, ApiError> {
    let report = state
        .reports
        .report(query.date.as_deref(), query.patient_id.as_deref())
        .await?;
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/api/visits",
    responses(
        (status = 200, description = "All visits, most recent first", body = [VisitRes]),
        (status = 500, description = "Database unavailable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn visits(State(state): State<AppState>) -> Result<Json<Vec<VisitRes>>, ApiError> {
    let visits = state.reports.list_visits().await?;
    Ok(Json(visits.into_iter().map(VisitRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthRes),
        (status = 503, description = "Database unreachable", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Probes the database. Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthRes>) {
    let res = HealthService::check_health(state.store.as_ref()).await;
    let status = if res.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(res))
}
