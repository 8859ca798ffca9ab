use crate::aggregate::{aggregate, summarize};
use crate::earnings::round2;
use crate::models::{
    Attribute, ChartSlice, GroupBy, GroupKey, Lesson, SummaryError, SummaryRow, TimePeriod,
};

/// Share of the total measure below which a pie category is folded into
/// a single "Other" slice.
const OTHER_THRESHOLD: f64 = 0.01;

pub fn totals(lessons: &[Lesson]) -> Result<Vec<SummaryRow>, SummaryError> {
    aggregate(lessons, GroupBy::Total)
}

pub fn by_time(lessons: &[Lesson], period: TimePeriod) -> Result<Vec<SummaryRow>, SummaryError> {
    aggregate(lessons, GroupBy::Period(period))
}

pub fn by_level(lessons: &[Lesson]) -> Result<Vec<SummaryRow>, SummaryError> {
    aggregate(lessons, GroupBy::Attribute(Attribute::Level))
}

pub fn by_subject(lessons: &[Lesson]) -> Result<Vec<SummaryRow>, SummaryError> {
    aggregate(lessons, GroupBy::Attribute(Attribute::Subject))
}

pub fn by_pay_method(lessons: &[Lesson]) -> Result<Vec<SummaryRow>, SummaryError> {
    aggregate(lessons, GroupBy::Attribute(Attribute::PayMethod))
}

/// Per-student table. The distinct-student count is dropped because it would
/// always equal one.
pub fn by_student(lessons: &[Lesson]) -> Result<Vec<SummaryRow>, SummaryError> {
    summarize(
        lessons,
        |lesson| GroupKey::Value(lesson.student_name.clone()),
        false,
        false,
    )
}

/// A summary table paired with the names the export sink uses for it.
pub struct NamedTable {
    pub name: &'static str,
    pub key_header: &'static str,
    pub rows: Vec<SummaryRow>,
}

/// The fixed catalog of exported tables, in the order reports list them.
pub fn named_tables(lessons: &[Lesson]) -> Result<Vec<NamedTable>, SummaryError> {
    Ok(vec![
        NamedTable {
            name: "yearly_summary",
            key_header: "year",
            rows: by_time(lessons, TimePeriod::Year)?,
        },
        NamedTable {
            name: "monthly_summary",
            key_header: "month",
            rows: by_time(lessons, TimePeriod::Month)?,
        },
        NamedTable {
            name: "weekly_summary",
            key_header: "week",
            rows: by_time(lessons, TimePeriod::Week)?,
        },
        NamedTable {
            name: "subject_summary",
            key_header: "subject",
            rows: by_subject(lessons)?,
        },
        NamedTable {
            name: "level_summary",
            key_header: "level",
            rows: by_level(lessons)?,
        },
        NamedTable {
            name: "student_summary",
            key_header: "student_name",
            rows: by_student(lessons)?,
        },
        NamedTable {
            name: "pay_method_summary",
            key_header: "pay_method",
            rows: by_pay_method(lessons)?,
        },
    ])
}

/// Measure a pie chart slices a summary table by.
#[derive(Debug, Clone, Copy)]
pub enum Measure {
    Hours,
    Students,
}

fn measure_value(row: &SummaryRow, measure: Measure) -> f64 {
    match measure {
        Measure::Hours => row.hours,
        Measure::Students => row.n_students.unwrap_or(0) as f64,
    }
}

/// Turns a summary table into pie-chart slices, largest first, with
/// categories under 1% of the total collapsed into one "Other" slice.
pub fn pie_slices(rows: &[SummaryRow], measure: Measure) -> Vec<ChartSlice> {
    let mut labeled: Vec<(String, f64)> = rows
        .iter()
        .map(|row| (row.key.to_string(), measure_value(row, measure)))
        .collect();
    labeled.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = labeled.iter().map(|(_, value)| value).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    let mut other = 0.0;
    for (label, value) in labeled {
        if value / total >= OTHER_THRESHOLD {
            slices.push(ChartSlice { label, value });
        } else {
            other += value;
        }
    }
    if other > 0.0 {
        slices.push(ChartSlice {
            label: "Other".to_string(),
            value: round2(other),
        });
    }
    slices
}

/// A pie-chart data set for the chart collaborator.
#[derive(Debug, serde::Serialize)]
pub struct ChartSet {
    #[serde(skip)]
    pub name: &'static str,
    pub title: &'static str,
    pub slices: Vec<ChartSlice>,
}

/// The three standing figures: subjects by hours, subjects by students,
/// levels by students.
pub fn chart_sets(lessons: &[Lesson]) -> Result<Vec<ChartSet>, SummaryError> {
    let subjects = by_subject(lessons)?;
    let levels = by_level(lessons)?;
    Ok(vec![
        ChartSet {
            name: "hours-subjects",
            title: "Subjects by hours tutored",
            slices: pie_slices(&subjects, Measure::Hours),
        },
        ChartSet {
            name: "students-subjects",
            title: "Subjects by number of students",
            slices: pie_slices(&subjects, Measure::Students),
        },
        ChartSet {
            name: "students-level",
            title: "Levels by number of students",
            slices: pie_slices(&levels, Measure::Students),
        },
    ])
}
