//! Input validation utilities.
//!
//! Scan input arrives as loosely-typed strings from the wire. Everything here turns it into
//! domain values, or rejects it, before the store is consulted.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use tracker_types::{Location, NonEmptyText};

use crate::error::ValidationError;
use crate::visit::NewVisit;

/// Stored timestamps keep microsecond precision.
const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// Stored timestamps are RFC 3339 text, which only has room for a four-digit year.
const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Validates raw scan input and builds the visit to insert.
///
/// `now` is used when no timestamp is supplied.
///
/// # Errors
///
/// - [`ValidationError::MissingScanFields`] if the patient id or location is missing or blank.
/// - [`ValidationError::UnknownLocation`] if the location is not an exact, case-sensitive match
///   for one of the known codes.
/// - [`ValidationError::InvalidTimestamp`] if a supplied timestamp cannot be parsed.
pub fn validate_scan(
    patient_id: Option<&str>,
    location: Option<&str>,
    timestamp: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<NewVisit, ValidationError> {
    let patient_id = patient_id
        .and_then(|p| NonEmptyText::new(p).ok())
        .ok_or(ValidationError::MissingScanFields)?;
    let location = location
        .filter(|l| !l.trim().is_empty())
        .ok_or(ValidationError::MissingScanFields)?;

    let location = location
        .parse::<Location>()
        .map_err(|e| ValidationError::UnknownLocation(e.0))?;

    let timestamp = match timestamp.filter(|t| !t.trim().is_empty()) {
        Some(raw) => parse_scan_timestamp(raw)?,
        None => now,
    };

    Ok(NewVisit::new(
        patient_id,
        location,
        timestamp.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS),
    ))
}

/// Parses a caller-supplied scan timestamp.
///
/// RFC 3339 values keep their offset. A date-time without an offset is taken as UTC. Years
/// outside `0000..=9999` (signed or five-digit forms) are rejected.
pub fn parse_scan_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, ValidationError> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| {
            NAIVE_DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .filter(|ts| TIMESTAMP_YEARS.contains(&ts.year()))
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))
}

/// Best-effort parse of a report date filter.
///
/// Returns `None` for anything unrecognised; callers treat that as "no date filter".
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.date())
}

/// The current instant as a fixed-offset UTC timestamp.
pub fn now_utc() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
