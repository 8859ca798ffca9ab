use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// One tutoring session, immutable after load except for `net_earned`,
/// which `earnings::apply_tax` fills in.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub student_name: String,
    pub subject: String,
    pub level: String,
    pub pay_method: String,
    pub start_timestamp: NaiveDateTime,
    /// Minutes; strictly positive for any lesson admitted to aggregation.
    pub duration_minutes: f64,
    /// Gross currency amount.
    pub earned: f64,
    pub rating: Option<f64>,
    pub net_earned: Option<f64>,
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
    #[error("unrecognized grouping attribute {0:?}")]
    InvalidAttribute(String),
    #[error("group {0:?} has zero total duration, average rate is undefined")]
    ZeroDuration(String),
}

/// Calendar granularity for time-period summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    Year,
    Month,
    Week,
    Day,
}

impl std::str::FromStr for TimePeriod {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(TimePeriod::Year),
            "month" => Ok(TimePeriod::Month),
            "week" => Ok(TimePeriod::Week),
            "day" => Ok(TimePeriod::Day),
            other => Err(SummaryError::InvalidAttribute(other.to_string())),
        }
    }
}

/// Categorical lesson attributes the aggregator can group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Level,
    Subject,
    PayMethod,
}

/// Grouping selector for the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Single bucket holding every lesson.
    Total,
    Attribute(Attribute),
    Period(TimePeriod),
}

impl std::str::FromStr for GroupBy {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(GroupBy::Total),
            "level" => Ok(GroupBy::Attribute(Attribute::Level)),
            "subject" => Ok(GroupBy::Attribute(Attribute::Subject)),
            "pay_method" => Ok(GroupBy::Attribute(Attribute::PayMethod)),
            "year" | "month" | "week" | "day" => Ok(GroupBy::Period(s.parse()?)),
            other => Err(SummaryError::InvalidAttribute(other.to_string())),
        }
    }
}

/// Bucket key of a summary row. Derives `Ord` so time-period tables can be
/// sorted chronologically; week keys carry the ISO year first so weeks
/// straddling a year boundary order correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Total,
    Value(String),
    Year(i32),
    Month(i32, u32),
    Week(i32, u32),
    Day(NaiveDate),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Total => write!(f, "total"),
            GroupKey::Value(value) => write!(f, "{value}"),
            GroupKey::Year(year) => write!(f, "{year}"),
            GroupKey::Month(year, month) => write!(f, "{year}-{month:02}"),
            GroupKey::Week(year, week) => write!(f, "{year}-W{week:02}"),
            GroupKey::Day(date) => write!(f, "{date}"),
        }
    }
}

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: GroupKey,
    pub n_lessons: usize,
    /// Distinct students in the bucket; `None` for the per-student table,
    /// where it would always equal one.
    pub n_students: Option<usize>,
    pub hours: f64,
    pub earned: f64,
    pub av_rate: f64,
    pub net_earned: Option<f64>,
    pub av_net_rate: Option<f64>,
}

/// One slice of pie-chart data handed to a chart collaborator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
}
