use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;

use crate::models::{Lesson, SummaryRow};
use crate::summary;

/// Creates (or reuses) `<base>/<YYYY-MM-DD>/` for today's run. Returns `None`
/// when output for today already exists and `overwrite` is off.
pub fn dated_dir(base: &Path, overwrite: bool) -> anyhow::Result<Option<PathBuf>> {
    let dir = base.join(Local::now().date_naive().format("%Y-%m-%d").to_string());
    if dir.exists() && !overwrite {
        return Ok(None);
    }
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    Ok(Some(dir))
}

fn write_table(path: &Path, key_header: &str, rows: &[SummaryRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let with_students = rows.first().is_some_and(|row| row.n_students.is_some());
    let with_net = rows.first().is_some_and(|row| row.net_earned.is_some());

    let mut header = vec![key_header.to_string(), "n_lessons".to_string()];
    if with_students {
        header.push("n_students".to_string());
    }
    header.extend(["hours".to_string(), "earned".to_string(), "av_rate".to_string()]);
    if with_net {
        header.extend(["net_earned".to_string(), "av_net_rate".to_string()]);
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.key.to_string(), row.n_lessons.to_string()];
        if let Some(n_students) = row.n_students {
            record.push(n_students.to_string());
        }
        record.extend([
            row.hours.to_string(),
            row.earned.to_string(),
            row.av_rate.to_string(),
        ]);
        if let (Some(net), Some(net_rate)) = (row.net_earned, row.av_net_rate) {
            record.extend([net.to_string(), net_rate.to_string()]);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the full summary catalog as CSV files under a dated subdirectory.
pub fn export_summaries(
    base: &Path,
    lessons: &[Lesson],
    overwrite: bool,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(dir) = dated_dir(base, overwrite)? else {
        return Ok(None);
    };
    for table in summary::named_tables(lessons)? {
        let path = dir.join(format!("{}.csv", table.name));
        write_table(&path, table.key_header, &table.rows)?;
    }
    Ok(Some(dir))
}

/// Writes the standing pie-chart data sets as JSON files under a dated
/// subdirectory, ready for a chart renderer.
pub fn export_chart_data(
    base: &Path,
    lessons: &[Lesson],
    overwrite: bool,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(dir) = dated_dir(base, overwrite)? else {
        return Ok(None);
    };
    for set in summary::chart_sets(lessons)? {
        let path = dir.join(format!("{}.json", set.name));
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &set)?;
    }
    Ok(Some(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earnings::apply_tax;
    use crate::normalize::parse_timestamp;
    use std::collections::HashMap;

    fn sample_lessons() -> Vec<Lesson> {
        vec![
            Lesson {
                student_name: "Ana".to_string(),
                subject: "Math".to_string(),
                level: "GCSE".to_string(),
                pay_method: "cash".to_string(),
                start_timestamp: parse_timestamp("2024-03-05 14:00:00").unwrap(),
                duration_minutes: 60.0,
                earned: 30.0,
                rating: Some(5.0),
                net_earned: None,
            },
            Lesson {
                student_name: "Ben".to_string(),
                subject: "Physics".to_string(),
                level: "A-level".to_string(),
                pay_method: "bank".to_string(),
                start_timestamp: parse_timestamp("2024-04-01 09:00:00").unwrap(),
                duration_minutes: 90.0,
                earned: 60.0,
                rating: None,
                net_earned: None,
            },
        ]
    }

    #[test]
    fn exports_all_seven_summary_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = export_summaries(tmp.path(), &sample_lessons(), true)
            .unwrap()
            .unwrap();
        for name in [
            "yearly_summary",
            "monthly_summary",
            "weekly_summary",
            "subject_summary",
            "level_summary",
            "student_summary",
            "pay_method_summary",
        ] {
            assert!(dir.join(format!("{name}.csv")).exists(), "missing {name}");
        }
    }

    #[test]
    fn summary_csv_carries_net_columns_when_taxed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut lessons = sample_lessons();
        apply_tax(&mut lessons, &HashMap::from([("cash".to_string(), 0.1)]));

        let dir = export_summaries(tmp.path(), &lessons, true).unwrap().unwrap();
        let contents = std::fs::read_to_string(dir.join("subject_summary.csv")).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "subject,n_lessons,n_students,hours,earned,av_rate,net_earned,av_net_rate"
        );
        // Physics first: equal lesson counts, more hours.
        assert_eq!(lines.next().unwrap(), "Physics,1,1,1.5,60,40,60,40");
        assert_eq!(lines.next().unwrap(), "Math,1,1,1,30,30,27,27");
    }

    #[test]
    fn student_summary_has_no_student_count_column() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = export_summaries(tmp.path(), &sample_lessons(), true)
            .unwrap()
            .unwrap();
        let contents = std::fs::read_to_string(dir.join("student_summary.csv")).unwrap();
        assert!(contents.starts_with("student_name,n_lessons,hours,earned,av_rate"));
    }

    #[test]
    fn refuses_second_export_without_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let lessons = sample_lessons();
        assert!(export_summaries(tmp.path(), &lessons, false).unwrap().is_some());
        assert!(export_summaries(tmp.path(), &lessons, false).unwrap().is_none());
        assert!(export_summaries(tmp.path(), &lessons, true).unwrap().is_some());
    }

    #[test]
    fn chart_data_is_valid_json_with_slices() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = export_chart_data(tmp.path(), &sample_lessons(), true)
            .unwrap()
            .unwrap();
        let contents = std::fs::read_to_string(dir.join("hours-subjects.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["title"], "Subjects by hours tutored");
        assert_eq!(value["slices"][0]["label"], "Physics");
        assert!(dir.join("students-subjects.json").exists());
        assert!(dir.join("students-level.json").exists());
    }
}
