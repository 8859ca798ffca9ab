use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::models::SummaryError;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Calendar decomposition of a lesson's start timestamp. Also the piece of
/// derivation logic a warehouse loader reuses for its time dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// ISO week number (1..=53).
    pub week: u32,
}

impl CalendarParts {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        CalendarParts {
            year: ts.year(),
            month: ts.month(),
            day: ts.day(),
            week: ts.iso_week().week(),
        }
    }
}

/// Parses a raw timestamp cell, accepting a date-time with either separator
/// or a bare date (taken as midnight).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SummaryError> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    Err(SummaryError::Timestamp(raw.to_string()))
}

/// Turns an empty rating cell into an explicit missing value instead of the
/// empty string. Cells that fail to parse as a number are treated the same
/// way, so this never fails.
pub fn normalize_rating(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}
