//! ==============================================================================
//! timestamp.rs - timestamp normalizer
//! ==============================================================================
//!
//! purpose:
//!     turns a caller-supplied identifier (path segment or body field) into a
//!     canonical store key.
//!
//! ```text
//!     "2015-09-01T16:00:00Z"      -> "2015-09-01T16:00:00.000Z"  (instant)
//!     "2015-09-01"                -> "2015-09-01"                (date-only)
//!
//!     a date-only key is a prefix of every instant key recorded that day.
//! ```
//!
//! ==============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::{MeasurementError, Result};

const NAIVE_INSTANT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Instant(DateTime<Utc>),
    Date(NaiveDate),
}

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MeasurementError::InvalidTimestamp);
        }

        if raw.contains('T') {
            parse_instant(raw).map(Timestamp::Instant)
        } else {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Timestamp::Date)
                .map_err(|_| MeasurementError::InvalidTimestamp)
        }
    }

    /// canonical store key
    pub fn key(&self) -> String {
        match self {
            Timestamp::Instant(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
            Timestamp::Date(day) => day.format("%Y-%m-%d").to_string(),
        }
    }

    /// the point in time this identifier denotes; a date is its midnight utc
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Instant(at) => *at,
            Timestamp::Date(day) => day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Timestamp::Date(_))
    }
}

/// parse + canonicalize in one step
pub fn normalize(raw: &str) -> Result<String> {
    Timestamp::parse(raw).map(|ts| ts.key())
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    // no offset given: read as utc
    NAIVE_INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(MeasurementError::InvalidTimestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_is_canonicalized() {
        assert_eq!(
            normalize("2015-09-01T16:00:00Z").unwrap(),
            "2015-09-01T16:00:00.000Z"
        );
        assert_eq!(
            normalize("2015-09-01T16:20:00.123Z").unwrap(),
            "2015-09-01T16:20:00.123Z"
        );
    }

    #[test]
    fn test_offset_converted_to_utc() {
        assert_eq!(
            normalize("2015-09-01T18:00:00+02:00").unwrap(),
            "2015-09-01T16:00:00.000Z"
        );
    }

    #[test]
    fn test_naive_instant_read_as_utc() {
        assert_eq!(normalize("2015-09-01T16:00").unwrap(), "2015-09-01T16:00:00.000Z");
        assert_eq!(
            normalize("2015-09-01T16:00:05.5").unwrap(),
            "2015-09-01T16:00:05.500Z"
        );
    }

    #[test]
    fn test_bare_date() {
        let ts = Timestamp::parse("2015-09-01").unwrap();
        assert!(ts.is_date());
        assert_eq!(ts.key(), "2015-09-01");
        assert_eq!(ts.instant().to_rfc3339(), "2015-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["2015-09-01T16:00:00Z", "2015-09-01T18:30:00.250+02:00", "2015-09-01"] {
            let once = normalize(raw).unwrap();
            assert_eq!(normalize(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_date_key_prefixes_instant_key() {
        let day = normalize("2015-09-01").unwrap();
        let at = normalize("2015-09-01T16:00:00Z").unwrap();
        assert!(at.starts_with(&day));
    }

    #[test]
    fn test_invalid_inputs() {
        for raw in ["", "   ", "not a date", "2015-13-01", "2015-09-01Tgarbage", "2015-02-30"] {
            assert_eq!(normalize(raw), Err(MeasurementError::InvalidTimestamp), "{raw}");
        }
    }
}
