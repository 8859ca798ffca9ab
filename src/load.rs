use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::models::Lesson;
use crate::normalize;

/// Lessons read from disk, plus how many rows were dropped for having a
/// non-positive duration.
pub struct LoadedLessons {
    pub lessons: Vec<Lesson>,
    pub skipped: usize,
}

pub fn read_lessons(path: &Path) -> anyhow::Result<LoadedLessons> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student_name: String,
        subject: String,
        level: String,
        pay_method: String,
        start_timestamp: String,
        duration: f64,
        effective_rate: f64,
        #[serde(default)]
        rating: String,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open lessons file {}", path.display()))?;

    let mut lessons = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        if row.duration <= 0.0 {
            skipped += 1;
            continue;
        }
        let start_timestamp = normalize::parse_timestamp(&row.start_timestamp)
            .with_context(|| format!("bad start_timestamp for student {}", row.student_name))?;
        lessons.push(Lesson {
            student_name: row.student_name,
            subject: row.subject,
            level: row.level,
            pay_method: row.pay_method,
            start_timestamp,
            duration_minutes: row.duration,
            earned: row.effective_rate * row.duration / 60.0,
            rating: normalize::normalize_rating(&row.rating),
            net_earned: None,
        });
    }

    Ok(LoadedLessons { lessons, skipped })
}

pub fn read_tax_rates(path: &Path) -> anyhow::Result<HashMap<String, f64>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        pay_method: String,
        tax_rate: f64,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open payment file {}", path.display()))?;

    let mut rates = HashMap::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        rates.insert(row.pay_method, row.tax_rate);
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_lessons_and_derives_earned() {
        let file = write_temp(
            "student_name,subject,level,pay_method,start_timestamp,duration,effective_rate,rating\n\
             Ana,Math,GCSE,cash,2024-03-05 14:00:00,90,40,4.5\n\
             Ben,Physics,A-level,bank,2024-03-06 10:00:00,60,35,\n",
        );
        let loaded = read_lessons(file.path()).unwrap();
        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.lessons.len(), 2);

        let ana = &loaded.lessons[0];
        assert_eq!(ana.earned, 60.0);
        assert_eq!(ana.rating, Some(4.5));

        let ben = &loaded.lessons[1];
        assert_eq!(ben.earned, 35.0);
        assert_eq!(ben.rating, None);
    }

    #[test]
    fn drops_rows_with_non_positive_duration() {
        let file = write_temp(
            "student_name,subject,level,pay_method,start_timestamp,duration,effective_rate,rating\n\
             Ana,Math,GCSE,cash,2024-03-05 14:00:00,0,40,\n\
             Ben,Physics,A-level,bank,2024-03-06 10:00:00,60,35,\n",
        );
        let loaded = read_lessons(file.path()).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.lessons.len(), 1);
        assert_eq!(loaded.lessons[0].student_name, "Ben");
    }

    #[test]
    fn malformed_timestamp_fails_the_load() {
        let file = write_temp(
            "student_name,subject,level,pay_method,start_timestamp,duration,effective_rate,rating\n\
             Ana,Math,GCSE,cash,not a date,60,40,\n",
        );
        assert!(read_lessons(file.path()).is_err());
    }

    #[test]
    fn reads_tax_rate_table() {
        let file = write_temp("pay_method,tax_rate\ncash,0.1\napp,0.25\n");
        let rates = read_tax_rates(file.path()).unwrap();
        assert_eq!(rates.get("cash"), Some(&0.1));
        assert_eq!(rates.get("app"), Some(&0.25));
        assert_eq!(rates.get("bank"), None);
    }
}
