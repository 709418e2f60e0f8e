//! JSON request and response bodies.
//!
//! Field names are camelCase on the wire, except the report query string which keeps
//! `patient_id` for compatibility with existing dashboards.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracker_core::{FlowStep, ScanInput, ValidationError, Visit, VisitReport};
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /api/scan`.
///
/// Every field is optional at the JSON level so that missing values are reported as
/// validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanReq {
    #[schema(example = "P001")]
    pub patient_id: Option<String>,
    #[schema(example = "main-entrance")]
    pub location: Option<String>,
    /// RFC 3339 date-time. Defaults to the time the request is handled.
    #[schema(example = "2024-01-15T09:30:00+01:00")]
    pub timestamp: Option<String>,
}

impl From<ScanReq> for ScanInput {
    fn from(req: ScanReq) -> Self {
        ScanInput {
            patient_id: req.patient_id,
            location: req.location,
            timestamp: req.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanRes {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&Visit> for ScanRes {
    fn from(visit: &Visit) -> Self {
        ScanRes {
            success: true,
            message: "Scan recorded successfully".into(),
            timestamp: visit.timestamp,
        }
    }
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    pub message: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Generic storage failure. Never carries backend detail.
    pub fn database_unavailable() -> Self {
        Self::new("Database unavailable", "Unable to connect to database")
    }
}

impl From<&ValidationError> for ErrorRes {
    fn from(err: &ValidationError) -> Self {
        Self::new(err.code(), err.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRes {
    pub id: i64,
    pub patient_id: String,
    #[schema(example = "registration")]
    pub location: String,
    pub timestamp: DateTime<FixedOffset>,
    pub scan_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<Visit> for VisitRes {
    fn from(visit: Visit) -> Self {
        VisitRes {
            id: visit.id,
            patient_id: visit.patient_id,
            location: visit.location.as_str().to_string(),
            timestamp: visit.timestamp,
            scan_type: visit.scan_type,
            created_at: visit.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlowStepRes {
    pub location: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<FlowStep> for FlowStepRes {
    fn from(step: FlowStep) -> Self {
        FlowStepRes {
            location: step.location.as_str().to_string(),
            timestamp: step.timestamp,
        }
    }
}

/// Body of `GET /api/reports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRes {
    pub visits: Vec<VisitRes>,
    pub patient_flows: BTreeMap<String, Vec<FlowStepRes>>,
    pub total_patients: usize,
}

impl From<VisitReport> for ReportRes {
    fn from(report: VisitReport) -> Self {
        ReportRes {
            visits: report.visits.into_iter().map(VisitRes::from).collect(),
            patient_flows: report
                .patient_flows
                .into_iter()
                .map(|(patient_id, steps)| {
                    (
                        patient_id,
                        steps.into_iter().map(FlowStepRes::from).collect(),
                    )
                })
                .collect(),
            total_patients: report.total_patients,
        }
    }
}

/// Query string of `GET /api/reports`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Calendar day, e.g. `2024-01-15`. Ignored if it cannot be parsed.
    pub date: Option<String>,
    /// Exact patient id.
    pub patient_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_core::Location;

    fn sample_visit() -> Visit {
        Visit {
            id: 7,
            patient_id: "P001".into(),
            location: Location::MainEntrance,
            timestamp: DateTime::parse_from_rfc3339("2024-01-15T09:30:00+01:00").unwrap(),
            scan_type: "normal".into(),
            created_at: DateTime::parse_from_rfc3339("2024-01-15T08:30:01Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_scan_req_accepts_missing_fields() {
        let req: ScanReq = serde_json::from_value(json!({ "patientId": "P001" })).unwrap();
        assert_eq!(req.patient_id.as_deref(), Some("P001"));
        assert!(req.location.is_none());
        assert!(req.timestamp.is_none());
    }

    #[test]
    fn test_visit_res_uses_camel_case_keys() {
        let value = serde_json::to_value(VisitRes::from(sample_visit())).unwrap();
        assert_eq!(value["patientId"], "P001");
        assert_eq!(value["location"], "main-entrance");
        assert_eq!(value["scanType"], "normal");
        assert_eq!(value["timestamp"], "2024-01-15T09:30:00+01:00");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_report_res_shape() {
        let report = tracker_core::build_report(vec![sample_visit()]);
        let value = serde_json::to_value(ReportRes::from(report)).unwrap();
        assert_eq!(value["totalPatients"], 1);
        assert_eq!(value["patientFlows"]["P001"][0]["location"], "main-entrance");
        assert_eq!(value["visits"][0]["id"], 7);
    }

    #[test]
    fn test_validation_error_maps_to_code_and_message() {
        let res = ErrorRes::from(&ValidationError::MissingScanFields);
        assert_eq!(
            res,
            ErrorRes::new("Invalid QR code", "Patient ID and location are required")
        );
    }
}
