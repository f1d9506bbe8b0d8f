//! Record ingestion from exported CSV files.
//!
//! Two layouts are understood, both as produced by the FitNotes export:
//! - exercise logs: `Date, Exercise, Category, Weight (lbs), Reps, ...`
//! - body tracker: `Date, Time, Measurement, Value, Unit, Comment`
//!
//! Columns the core has no use for (distance, time, comments) are discarded.
//! Unlike archived session history, a malformed row fails the whole load.

use crate::metrics::estimate_one_rep_max;
use crate::{
    BodyMeasurement, BodyweightTable, Error, ExerciseTable, LoggedSet, Result, Units, BODYWEIGHT,
};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Accepted date layouts, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a calendar date from any of the accepted layouts
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

/// CSV row format for exercise logs
#[derive(Debug, Deserialize)]
struct LiftRow {
    #[serde(rename = "Date", alias = "date")]
    date: Option<String>,
    #[serde(rename = "Exercise", alias = "exercise")]
    exercise: Option<String>,
    #[serde(rename = "Category", alias = "category")]
    category: Option<String>,
    #[serde(
        rename = "Weight (lbs)",
        alias = "Weight (kgs)",
        alias = "Weight (kg)",
        alias = "Weight",
        alias = "weight"
    )]
    weight: Option<f64>,
    #[serde(rename = "Reps", alias = "reps")]
    reps: Option<u32>,
    /// Written by the rollup; FitNotes exports leave it out
    #[serde(rename = "One Rep Max", alias = "one_rep_max", default)]
    one_rep_max: Option<f64>,
}

fn required<T>(value: Option<T>, field: &str, line: usize) -> Result<T> {
    value.ok_or_else(|| Error::InvalidRecord(format!("line {}: missing {}", line, field)))
}

fn at_line(err: Error, line: usize) -> Error {
    match err {
        Error::InvalidRecord(msg) => Error::InvalidRecord(format!("line {}: {}", line, msg)),
        other => other,
    }
}

impl LiftRow {
    fn into_logged_set(self, line: usize) -> Result<LoggedSet> {
        let date = parse_date(&required(self.date, "date", line)?)?;
        let exercise = required(self.exercise, "exercise", line)?;
        let category = required(self.category, "category", line)?;
        let weight = required(self.weight, "weight", line)?;
        let reps = required(self.reps, "reps", line)?;
        LoggedSet::check_weight_and_reps(weight, reps).map_err(|e| at_line(e, line))?;

        let one_rep_max = match self.one_rep_max {
            Some(stored) if stored.is_finite() && stored >= 0.0 => stored,
            Some(stored) => {
                return Err(Error::InvalidRecord(format!(
                    "line {}: one rep max must be a non-negative number, got {}",
                    line, stored
                )))
            }
            None => estimate_one_rep_max(weight, reps),
        };

        Ok(LoggedSet {
            date,
            exercise,
            category,
            weight,
            reps,
            one_rep_max,
        })
    }
}

/// CSV row format for body tracker exports
#[derive(Debug, Deserialize)]
struct MeasurementRow {
    #[serde(rename = "Date", alias = "date")]
    date: Option<String>,
    #[serde(rename = "Measurement", alias = "measurement")]
    measurement: Option<String>,
    #[serde(rename = "Value", alias = "value")]
    value: Option<String>,
    #[serde(rename = "Unit", alias = "unit")]
    unit: Option<String>,
}

impl MeasurementRow {
    fn is_bodyweight(&self) -> bool {
        self.measurement.as_deref() == Some(BODYWEIGHT)
    }

    fn into_measurement(self, line: usize) -> Result<BodyMeasurement> {
        let date = parse_date(&required(self.date, "date", line)?)?;
        let raw_value = required(self.value, "value", line)?;
        let value = raw_value.trim().parse::<f64>().map_err(|e| {
            Error::InvalidRecord(format!("line {}: value {:?}: {}", line, raw_value, e))
        })?;
        let unit: Units = required(self.unit, "unit", line)?.parse()?;

        Ok(BodyMeasurement {
            date,
            measurement: BODYWEIGHT.to_string(),
            value,
            unit,
        })
    }
}

/// Load an exercise log from any reader, deriving the estimated 1RM per row
pub fn read_lifts_csv<R: Read>(reader: R) -> Result<ExerciseTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<LiftRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = result?;
        rows.push(row.into_logged_set(line)?);
    }

    tracing::debug!("Parsed {} exercise rows", rows.len());
    Ok(ExerciseTable::from_rows(rows))
}

/// Load an exercise log CSV file
pub fn load_lifts_csv(path: &Path) -> Result<ExerciseTable> {
    let file = std::fs::File::open(path)?;
    let table = read_lifts_csv(file)?;
    tracing::info!("Loaded {} sets from {:?}", table.len(), path);
    Ok(table)
}

/// Load bodyweight rows from any reader.
///
/// Rows whose measurement is not exactly `Bodyweight` are dropped before
/// their values are looked at.
pub fn read_bodyweight_csv<R: Read>(reader: R) -> Result<BodyweightTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (index, result) in reader.deserialize::<MeasurementRow>().enumerate() {
        let line = index + 2;
        let row = result?;
        if !row.is_bodyweight() {
            dropped += 1;
            continue;
        }
        rows.push(row.into_measurement(line)?);
    }

    tracing::debug!(
        "Parsed {} bodyweight rows, dropped {} other measurements",
        rows.len(),
        dropped
    );
    Ok(BodyweightTable::from_rows(rows))
}

/// Load a body tracker CSV file
pub fn load_bodyweight_csv(path: &Path) -> Result<BodyweightTable> {
    let file = std::fs::File::open(path)?;
    let table = read_bodyweight_csv(file)?;
    tracing::info!("Loaded {} bodyweight entries from {:?}", table.len(), path);
    Ok(table)
}
