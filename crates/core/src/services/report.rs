//! Visit reports and listings.
//!
//! A report reconstructs each patient's path through the hospital: the filtered visits in
//! time order, grouped per patient.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracker_types::Location;

use crate::store::VisitStore;
use crate::validation::parse_report_date;
use crate::visit::{Visit, VisitFilter};
use crate::TrackerResult;

/// One hop in a patient's flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    pub location: Location,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitReport {
    /// Every matching visit, ascending by timestamp.
    pub visits: Vec<Visit>,
    /// Per-patient flows keyed by patient id.
    pub patient_flows: BTreeMap<String, Vec<FlowStep>>,
    pub total_patients: usize,
}

/// Sort visits by time and group them into patient flows.
///
/// Ordering does not depend on the order `visits` arrives in. Equal timestamps fall back to
/// insertion order via the id.
pub fn build_report(mut visits: Vec<Visit>) -> VisitReport {
    visits.sort_by_key(|v| (v.timestamp, v.id));

    let mut patient_flows: BTreeMap<String, Vec<FlowStep>> = BTreeMap::new();
    for visit in &visits {
        patient_flows
            .entry(visit.patient_id.clone())
            .or_default()
            .push(FlowStep {
                location: visit.location,
                timestamp: visit.timestamp,
            });
    }

    VisitReport {
        total_patients: patient_flows.len(),
        visits,
        patient_flows,
    }
}

/// Read-side operations: reports and the full visit listing.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn VisitStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self { store }
    }

    /// Build a report, optionally restricted to one calendar day and/or one patient.
    ///
    /// Empty strings count as "not supplied". A `date` that does not parse is ignored rather
    /// than rejected.
    pub async fn report(
        &self,
        date: Option<&str>,
        patient_id: Option<&str>,
    ) -> TrackerResult<VisitReport> {
        let date_filter = date.filter(|d| !d.is_empty()).and_then(|raw| {
            let parsed = parse_report_date(raw);
            if parsed.is_none() {
                tracing::debug!(date = raw, "ignoring unparsable report date");
            }
            parsed
        });

        let filter = VisitFilter {
            date: date_filter,
            patient_id: patient_id.filter(|p| !p.is_empty()).map(str::to_string),
        };

        let visits = self.store.query_visits(&filter).await?;
        Ok(build_report(visits))
    }

    /// Every visit, most recent first.
    pub async fn list_visits(&self) -> TrackerResult<Vec<Visit>> {
        let mut visits = self.store.query_visits(&VisitFilter::default()).await?;
        visits.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        Ok(visits)
    }
}
