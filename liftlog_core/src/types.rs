//! Core domain types for the Liftlog system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged sets and the exercise table
//! - Bodyweight measurements
//! - Lifter parameters (sex, units)
//! - Mutation inputs (new entries, removal selectors)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Measurement kind that marks a body-tracker row as a bodyweight entry.
///
/// Also the series name used when asking for bodyweight maxima.
pub const BODYWEIGHT: &str = "Bodyweight";

// ============================================================================
// Lifter Parameters
// ============================================================================

/// Sex category selecting the strength score coefficient set.
///
/// Only two cases exist: the female set, and the default set used for
/// every other value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl From<&str> for Sex {
    fn from(s: &str) -> Self {
        if s == "F" {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => write!(f, "F"),
            Sex::Male => write!(f, "M"),
        }
    }
}

/// Unit system for weights.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Pounds,
    Kilograms,
}

/// Pounds per kilogram.
pub const LB_PER_KG: f64 = 2.20462;

impl Units {
    /// Interpret a unit label the way the strength score does:
    /// `"lb"` means pounds, anything else is treated as already metric.
    pub fn from_label(label: &str) -> Self {
        if label == "lb" {
            Units::Pounds
        } else {
            Units::Kilograms
        }
    }

    /// Convert a weight expressed in these units to kilograms.
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Units::Pounds => value / LB_PER_KG,
            Units::Kilograms => value,
        }
    }

    /// Re-express `value`, given in these units, in `target` units
    pub fn convert(self, value: f64, target: Units) -> f64 {
        match (self, target) {
            (Units::Pounds, Units::Kilograms) => value / LB_PER_KG,
            (Units::Kilograms, Units::Pounds) => value * LB_PER_KG,
            _ => value,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Units::Pounds => "lb",
            Units::Kilograms => "kg",
        }
    }
}

impl FromStr for Units {
    type Err = crate::Error;

    /// Strict parse used for measurement rows.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim() {
            "lb" | "lbs" => Ok(Units::Pounds),
            "kg" | "kgs" => Ok(Units::Kilograms),
            other => Err(crate::Error::InvalidRecord(format!(
                "unknown weight unit {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Logged Sets
// ============================================================================

/// One logged set: a weight lifted for a number of reps on a given day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSet {
    pub date: NaiveDate,
    pub exercise: String,
    pub category: String,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: f64,
}

impl LoggedSet {
    /// Reject values no logged set may carry: a negative or non-finite
    /// weight, or zero reps.
    pub fn check_weight_and_reps(weight: f64, reps: u32) -> crate::Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(crate::Error::InvalidRecord(format!(
                "weight must be a non-negative number, got {}",
                weight
            )));
        }
        if reps == 0 {
            return Err(crate::Error::InvalidRecord("reps must be at least 1".into()));
        }
        Ok(())
    }
}

/// Ordered collection of logged sets.
///
/// Rows have no identity; duplicates are allowed and insertion order carries
/// no meaning beyond being the order rows were appended in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExerciseTable {
    rows: Vec<LoggedSet>,
}

impl ExerciseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<LoggedSet>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LoggedSet] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LoggedSet> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoggedSet> {
        self.rows.iter()
    }

    /// Distinct exercise names in first-seen order
    pub fn exercises(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.exercise.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Rows whose estimated one-rep max is strictly above `cutoff`
    pub fn above_one_rep_max(&self, cutoff: f64) -> ExerciseTable {
        self.rows
            .iter()
            .filter(|row| row.one_rep_max > cutoff)
            .cloned()
            .collect()
    }

    /// Rows whose exercise is one of `names`
    pub fn only_exercises(&self, names: &[&str]) -> ExerciseTable {
        self.rows
            .iter()
            .filter(|row| names.contains(&row.exercise.as_str()))
            .cloned()
            .collect()
    }
}

impl FromIterator<LoggedSet> for ExerciseTable {
    fn from_iter<I: IntoIterator<Item = LoggedSet>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExerciseTable {
    type Item = &'a LoggedSet;
    type IntoIter = std::slice::Iter<'a, LoggedSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ============================================================================
// Body Measurements
// ============================================================================

/// A body-tracker measurement. Only bodyweight rows survive ingestion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyMeasurement {
    pub date: NaiveDate,
    pub measurement: String,
    pub value: f64,
    pub unit: Units,
}

/// Collection of bodyweight measurements
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyweightTable {
    rows: Vec<BodyMeasurement>,
}

impl BodyweightTable {
    pub fn from_rows(rows: Vec<BodyMeasurement>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[BodyMeasurement] {
        &self.rows
    }

    /// Copy of the table with every value expressed in `units`
    pub fn in_units(&self, units: Units) -> BodyweightTable {
        let converted = self.rows.iter().filter(|row| row.unit != units).count();
        if converted > 0 {
            tracing::info!(
                "Converting {} of {} bodyweight entries to {}",
                converted,
                self.rows.len(),
                units
            );
        }

        let rows = self
            .rows
            .iter()
            .map(|row| BodyMeasurement {
                value: row.unit.convert(row.value, units),
                unit: units,
                ..row.clone()
            })
            .collect();
        BodyweightTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Mutation Inputs
// ============================================================================

/// Fields supplied when appending a set to a table.
///
/// `category` and `one_rep_max` are derived when absent. The date is given
/// as text and normalized by the mutation layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewExercise {
    pub date: String,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub one_rep_max: Option<f64>,
}

impl NewExercise {
    pub fn new(
        date: impl Into<String>,
        exercise: impl Into<String>,
        weight: f64,
        reps: u32,
    ) -> Self {
        Self {
            date: date.into(),
            exercise: exercise.into(),
            weight,
            reps,
            category: None,
            one_rep_max: None,
        }
    }
}

/// How many matching rows a removal drops
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemovalScope {
    /// Every matching row is removed
    #[default]
    AllMatches,
    /// Only the earliest-appended matching row is removed
    FirstMatch,
}

/// Criteria for removing rows from a table.
///
/// A row matches when its date and exercise are equal to the selector's and
/// every optional field that is set is equal too.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemovalSelector {
    pub date: NaiveDate,
    pub exercise: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub scope: RemovalScope,
}

impl RemovalSelector {
    pub fn new(date: NaiveDate, exercise: impl Into<String>) -> Self {
        Self {
            date,
            exercise: exercise.into(),
            weight: None,
            reps: None,
            scope: RemovalScope::AllMatches,
        }
    }

    pub fn matches(&self, row: &LoggedSet) -> bool {
        row.date == self.date
            && row.exercise == self.exercise
            && self.weight.map_or(true, |w| row.weight == w)
            && self.reps.map_or(true, |r| row.reps == r)
    }
}
