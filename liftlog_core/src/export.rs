//! CSV output: series tables for charting and rollup of stored lifts.
//!
//! The rollup converts the JSONL sink into the exercise-log CSV layout read
//! by [`crate::ingest`], so rolled-up history loads like any export. Two
//! trailing columns keep what the layout has no place for: the stored one
//! rep max (read back by ingestion) and the owner id.

use crate::sink::StoredLift;
use crate::{PeriodMaxima, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// A row in the exercise-log CSV output
#[derive(Debug, serde::Serialize)]
struct LiftCsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Exercise")]
    exercise: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Weight (lbs)")]
    weight: f64,
    #[serde(rename = "Reps")]
    reps: u32,
    #[serde(rename = "Distance")]
    distance: Option<f64>,
    #[serde(rename = "Distance Unit")]
    distance_unit: Option<String>,
    #[serde(rename = "Time")]
    time: Option<String>,
    #[serde(rename = "Comment")]
    comment: Option<String>,
    #[serde(rename = "One Rep Max")]
    one_rep_max: f64,
    #[serde(rename = "Owner")]
    owner_id: Option<u32>,
}

impl From<&StoredLift> for LiftCsvRow {
    fn from(lift: &StoredLift) -> Self {
        LiftCsvRow {
            date: lift.date.format("%Y-%m-%d").to_string(),
            exercise: lift.exercise.clone(),
            category: lift.category.clone(),
            weight: lift.weight,
            reps: lift.reps,
            distance: None,
            distance_unit: None,
            time: None,
            comment: None,
            one_rep_max: lift.one_rep_max,
            owner_id: lift.owner_id,
        }
    }
}

/// Write named series side by side: a `date` column, then one column per
/// series. Cells are empty where a series has no value for that period.
pub fn write_series_csv<W: Write>(series: &[&PeriodMaxima], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    writer.write_record(&header)?;

    let periods: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.values.keys().copied())
        .collect();

    for period in &periods {
        let mut record = vec![period.format("%Y-%m-%d").to_string()];
        record.extend(
            series
                .iter()
                .map(|s| s.get(*period).map(|v| format!("{:.2}", v)).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    tracing::debug!(
        "Wrote {} periods for {} series",
        periods.len(),
        series.len()
    );
    Ok(())
}

/// Write named series to a CSV file, replacing it
pub fn export_series_csv(series: &[&PeriodMaxima], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_series_csv(series, file)?;
    tracing::info!("Exported {} series to {:?}", series.len(), path);
    Ok(())
}

/// Roll up stored lifts into the exercise-log CSV and archive the JSONL file
///
/// This function:
/// 1. Reads all lifts from the JSONL file
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the JSONL file to `.processed`
/// 5. Returns the number of lifts processed
pub fn rollup_to_csv(jsonl_path: &Path, csv_path: &Path) -> Result<usize> {
    let lifts = crate::sink::read_lifts(jsonl_path)?;

    if lifts.is_empty() {
        tracing::info!("No stored lifts to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Appending to an existing file must not repeat the header
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for lift in &lifts {
        writer.serialize(LiftCsvRow::from(lift))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} lifts to CSV", lifts.len());

    let processed_path = jsonl_path.with_extension("jsonl.processed");
    std::fs::rename(jsonl_path, &processed_path)?;

    tracing::info!("Archived lift log to {:?}", processed_path);

    Ok(lifts.len())
}

/// Clean up old processed lift logs
///
/// This removes all `.processed` files in the given directory.
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed lift log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed lift logs", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::load_lifts_csv;
    use crate::sink::{JsonlLiftSink, LiftSink};
    use crate::LoggedSet;
    use std::fs::File;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn stored(exercise: &str, weight: f64, reps: u32) -> StoredLift {
        let set = LoggedSet {
            date: d(2019, 9, 1),
            exercise: exercise.into(),
            category: "Back".into(),
            weight,
            reps,
            one_rep_max: crate::metrics::estimate_one_rep_max(weight, reps),
        };
        StoredLift::from_logged_set(&set, None)
    }

    #[test]
    fn test_series_csv_layout() {
        let squat = PeriodMaxima {
            name: "Barbell Squat".into(),
            values: [(d(2020, 1, 31), 300.0), (d(2020, 2, 29), 310.5)]
                .into_iter()
                .collect(),
        };
        let bodyweight = PeriodMaxima {
            name: "Bodyweight".into(),
            values: [(d(2020, 2, 29), 181.0)].into_iter().collect(),
        };

        let mut out = Vec::new();
        write_series_csv(&[&squat, &bodyweight], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,Barbell Squat,Bodyweight");
        assert_eq!(lines[1], "2020-01-31,300.00,");
        assert_eq!(lines[2], "2020-02-29,310.50,181.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_rollup_creates_loadable_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("lifts.jsonl");
        let csv_path = temp_dir.path().join("lifts.csv");

        let mut sink = JsonlLiftSink::new(&jsonl_path);
        sink.append(&stored("Deadlift", 500.0, 1)).unwrap();
        sink.append(&stored("Deadlift", 450.0, 3)).unwrap();

        let count = rollup_to_csv(&jsonl_path, &csv_path).unwrap();
        assert_eq!(count, 2);
        assert!(!jsonl_path.exists());
        assert!(jsonl_path.with_extension("jsonl.processed").exists());

        let table = load_lifts_csv(&csv_path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].weight, 500.0);
        assert_eq!(table.rows()[1].reps, 3);
    }

    #[test]
    fn test_rollup_keeps_owner_and_stored_one_rep_max() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("lifts.jsonl");
        let csv_path = temp_dir.path().join("lifts.csv");

        let mut lift = stored("Deadlift", 500.0, 3);
        lift.one_rep_max = 600.0;
        lift.owner_id = Some(7);
        JsonlLiftSink::new(&jsonl_path).append(&lift).unwrap();
        rollup_to_csv(&jsonl_path, &csv_path).unwrap();

        let text = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with(",Comment,One Rep Max,Owner"));
        assert!(lines[1].ends_with(",600.0,7"));

        let table = load_lifts_csv(&csv_path).unwrap();
        assert_eq!(table.rows()[0].one_rep_max, 600.0);
    }

    #[test]
    fn test_rollup_appends_without_repeating_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("lifts.jsonl");
        let csv_path = temp_dir.path().join("lifts.csv");

        let mut sink = JsonlLiftSink::new(&jsonl_path);
        sink.append(&stored("Deadlift", 500.0, 1)).unwrap();
        assert_eq!(rollup_to_csv(&jsonl_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlLiftSink::new(&jsonl_path);
        sink.append(&stored("Deadlift", 505.0, 1)).unwrap();
        assert_eq!(rollup_to_csv(&jsonl_path, &csv_path).unwrap(), 1);

        let table = load_lifts_csv(&csv_path).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rollup_empty_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let jsonl_path = temp_dir.path().join("empty.jsonl");
        let csv_path = temp_dir.path().join("lifts.csv");
        File::create(&jsonl_path).unwrap();

        assert_eq!(rollup_to_csv(&jsonl_path, &csv_path).unwrap(), 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("a.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("b.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("lifts.jsonl")).unwrap();

        assert_eq!(cleanup_processed(temp_dir.path()).unwrap(), 2);
        assert!(temp_dir.path().join("lifts.jsonl").exists());
    }
}
