use std::sync::Arc;

use api_rest::{app, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracker_core::{MemoryVisitStore, SqliteVisitStore};

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn scan(router: &Router, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, "/api/scan", Some(body)).await
}

async fn sqlite_app() -> Router {
    let store = SqliteVisitStore::in_memory().await.unwrap();
    app(AppState::new(Arc::new(store)))
}

fn memory_app() -> (Arc<MemoryVisitStore>, Router) {
    let store = Arc::new(MemoryVisitStore::new());
    (store.clone(), app(AppState::new(store)))
}

#[tokio::test]
async fn test_scan_valid_request_returns_ok() {
    let router = sqlite_app().await;
    let (status, body) = scan(
        &router,
        json!({"patientId": "P001", "location": "parking"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Scan recorded successfully");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_scan_with_custom_timestamp_echoes_it() {
    let router = sqlite_app().await;
    let (status, body) = scan(
        &router,
        json!({"patientId": "P001", "location": "lab", "timestamp": "2024-01-15T09:30:00+01:00"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timestamp"], "2024-01-15T09:30:00+01:00");
}

#[tokio::test]
async fn test_scan_missing_fields_is_invalid_qr_code() {
    let router = sqlite_app().await;
    for body in [
        json!({"patientId": "", "location": "parking"}),
        json!({"patientId": "   ", "location": "parking"}),
        json!({"patientId": "P001", "location": ""}),
        json!({"location": "parking"}),
        json!({}),
    ] {
        let (status, res) = scan(&router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"], "Invalid QR code");
        assert_eq!(res["message"], "Patient ID and location are required");
    }
}

#[tokio::test]
async fn test_scan_unknown_location_is_rejected() {
    let router = sqlite_app().await;
    for location in ["PARKING", "cafeteria", "Lab"] {
        let (status, res) = scan(
            &router,
            json!({"patientId": "P001", "location": location}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"], "Invalid location");
        assert_eq!(res["message"], "Location not recognized");
    }
}

#[tokio::test]
async fn test_scan_bad_timestamp_is_rejected() {
    let router = sqlite_app().await;
    let (status, res) = scan(
        &router,
        json!({"patientId": "P001", "location": "lab", "timestamp": "not-a-time"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["error"], "Invalid timestamp");
}

#[tokio::test]
async fn test_scan_malformed_json_is_bad_request() {
    let router = sqlite_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn test_consecutive_duplicate_scans_overwrite_previous() {
    let router = sqlite_app().await;
    for ts in ["2024-01-15T08:00:00Z", "2024-01-15T08:10:00Z"] {
        scan(
            &router,
            json!({"patientId": "P1", "location": "parking", "timestamp": ts}),
        )
        .await;
    }

    let (status, visits) = send(&router, Method::GET, "/api/visits", None).await;
    assert_eq!(status, StatusCode::OK);
    let visits = visits.as_array().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0]["location"], "parking");
    assert_eq!(visits[0]["timestamp"], "2024-01-15T08:10:00+00:00");
}

#[tokio::test]
async fn test_non_consecutive_duplicate_location_allows_multiple_visits() {
    let router = sqlite_app().await;
    for (location, ts) in [
        ("parking", "2024-01-15T08:00:00Z"),
        ("main-entrance", "2024-01-15T08:05:00Z"),
        ("parking", "2024-01-15T08:10:00Z"),
    ] {
        let (status, _) = scan(
            &router,
            json!({"patientId": "P1", "location": location, "timestamp": ts}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, visits) = send(&router, Method::GET, "/api/visits", None).await;
    assert_eq!(visits.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_visits_are_listed_most_recent_first() {
    let router = sqlite_app().await;
    for (patient, ts) in [
        ("P1", "2024-01-15T08:00:00Z"),
        ("P2", "2024-01-15T10:00:00Z"),
        ("P3", "2024-01-15T09:00:00Z"),
    ] {
        scan(
            &router,
            json!({"patientId": patient, "location": "lab", "timestamp": ts}),
        )
        .await;
    }

    let (_, visits) = send(&router, Method::GET, "/api/visits", None).await;
    let patients: Vec<_> = visits
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["patientId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(patients, vec!["P2", "P3", "P1"]);
}

#[tokio::test]
async fn test_reports_empty_store() {
    let router = sqlite_app().await;
    let (status, body) = send(&router, Method::GET, "/api/reports", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"visits": [], "patientFlows": {}, "totalPatients": 0}));
}

#[tokio::test]
async fn test_reports_patient_flow_and_filters() {
    let router = sqlite_app().await;
    for (patient, location, ts) in [
        ("P001", "consultation", "2024-01-15T09:00:00Z"),
        ("P001", "parking", "2024-01-15T08:00:00Z"),
        ("P002", "parking", "2024-01-15T08:30:00Z"),
        ("P001", "registration", "2024-01-15T08:45:00Z"),
        ("P003", "lab", "2024-01-16T11:00:00Z"),
    ] {
        scan(
            &router,
            json!({"patientId": patient, "location": location, "timestamp": ts}),
        )
        .await;
    }

    let (status, body) =
        send(&router, Method::GET, "/api/reports?patient_id=P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPatients"], 1);
    let flow: Vec<_> = body["patientFlows"]["P001"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["location"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(flow, vec!["parking", "registration", "consultation"]);

    let (_, body) = send(&router, Method::GET, "/api/reports?date=2024-01-16", None).await;
    assert_eq!(body["totalPatients"], 1);
    assert_eq!(body["visits"][0]["patientId"], "P003");

    let (_, all) = send(&router, Method::GET, "/api/reports", None).await;
    let (_, ignored) = send(&router, Method::GET, "/api/reports?date=invalid-date", None).await;
    assert_eq!(all["totalPatients"], 3);
    assert_eq!(ignored, all);

    let (status, nobody) =
        send(&router, Method::GET, "/api/reports?patient_id=P999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nobody["totalPatients"], 0);
    assert!(nobody["patientFlows"].get("P999").is_none());
}

#[tokio::test]
async fn test_health_reports_connected_database() {
    let router = sqlite_app().await;
    let (status, body) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_storage_outage_maps_to_500_and_503() {
    let (store, router) = memory_app();
    store.set_available(false);

    let (status, body) = scan(&router, json!({"patientId": "P001", "location": "lab"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Database unavailable", "message": "Unable to connect to database"})
    );

    let (status, _) = send(&router, Method::GET, "/api/reports", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&router, Method::GET, "/api/visits", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_validation_wins_over_outage() {
    let (store, router) = memory_app();
    store.set_available(false);

    let (status, body) = scan(
        &router,
        json!({"patientId": "P001", "location": "PARKING"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid location");
}

#[tokio::test]
async fn test_closed_sqlite_pool_is_database_unavailable() {
    let store = Arc::new(SqliteVisitStore::in_memory().await.unwrap());
    let router = app(AppState::new(store.clone()));
    store.close().await;

    let (status, body) = send(&router, Method::GET, "/api/visits", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database unavailable");

    let (status, _) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let router = sqlite_app().await;
    let (status, doc) = send(&router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/api/scan", "/api/reports", "/api/visits", "/api/health"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
