use std::collections::{HashMap, HashSet};

use chrono::Datelike;

use crate::earnings::round2;
use crate::models::{Attribute, GroupBy, GroupKey, Lesson, SummaryError, SummaryRow, TimePeriod};
use crate::normalize::CalendarParts;

fn bucket_key(lesson: &Lesson, group_by: GroupBy) -> GroupKey {
    match group_by {
        GroupBy::Total => GroupKey::Total,
        GroupBy::Attribute(Attribute::Level) => GroupKey::Value(lesson.level.clone()),
        GroupBy::Attribute(Attribute::Subject) => GroupKey::Value(lesson.subject.clone()),
        GroupBy::Attribute(Attribute::PayMethod) => GroupKey::Value(lesson.pay_method.clone()),
        GroupBy::Period(period) => {
            let parts = CalendarParts::from_timestamp(lesson.start_timestamp);
            match period {
                TimePeriod::Year => GroupKey::Year(parts.year),
                TimePeriod::Month => GroupKey::Month(parts.year, parts.month),
                TimePeriod::Week => {
                    let iso = lesson.start_timestamp.iso_week();
                    GroupKey::Week(iso.year(), iso.week())
                }
                TimePeriod::Day => GroupKey::Day(lesson.start_timestamp.date()),
            }
        }
    }
}

#[derive(Default)]
struct Bucket<'a> {
    n_lessons: usize,
    students: HashSet<&'a str>,
    duration_sum: f64,
    earned_sum: f64,
    net_sum: f64,
}

/// Groups lessons and derives the summary metrics for each bucket. Time
/// granularities come back in chronological order, everything else in
/// descending `(n_lessons, hours)` order.
pub fn aggregate(lessons: &[Lesson], group_by: GroupBy) -> Result<Vec<SummaryRow>, SummaryError> {
    let chronological = matches!(group_by, GroupBy::Period(_));
    summarize(lessons, |lesson| bucket_key(lesson, group_by), true, chronological)
}

/// Shared bucket fold behind both `aggregate` and the per-student table.
/// `count_students` drops the distinct-student column where it would be
/// redundant with the grouping key.
pub(crate) fn summarize<F>(
    lessons: &[Lesson],
    key_of: F,
    count_students: bool,
    chronological: bool,
) -> Result<Vec<SummaryRow>, SummaryError>
where
    F: Fn(&Lesson) -> GroupKey,
{
    let with_net = lessons.iter().any(|lesson| lesson.net_earned.is_some());
    let mut buckets: HashMap<GroupKey, Bucket> = HashMap::new();

    for lesson in lessons {
        let bucket = buckets.entry(key_of(lesson)).or_default();
        bucket.n_lessons += 1;
        bucket.students.insert(lesson.student_name.as_str());
        bucket.duration_sum += lesson.duration_minutes;
        bucket.earned_sum += lesson.earned;
        bucket.net_sum += lesson.net_earned.unwrap_or(0.0);
    }

    let mut rows = Vec::with_capacity(buckets.len());
    for (key, bucket) in buckets {
        if bucket.duration_sum <= 0.0 {
            return Err(SummaryError::ZeroDuration(key.to_string()));
        }
        let av_rate = round2(60.0 * bucket.earned_sum / bucket.duration_sum);
        let av_net_rate = with_net.then(|| round2(60.0 * bucket.net_sum / bucket.duration_sum));
        rows.push(SummaryRow {
            key,
            n_lessons: bucket.n_lessons,
            n_students: count_students.then_some(bucket.students.len()),
            hours: round2(bucket.duration_sum / 60.0),
            earned: round2(bucket.earned_sum),
            av_rate,
            net_earned: with_net.then(|| round2(bucket.net_sum)),
            av_net_rate,
        });
    }

    if chronological {
        rows.sort_by(|a, b| a.key.cmp(&b.key));
    } else {
        rows.sort_by(|a, b| {
            b.n_lessons
                .cmp(&a.n_lessons)
                .then(b.hours.total_cmp(&a.hours))
                .then_with(|| a.key.cmp(&b.key))
        });
    }

    Ok(rows)
}
