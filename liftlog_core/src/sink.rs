//! Append-only persistence for logged sets.
//!
//! Sets are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{ExerciseTable, LoggedSet, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A logged set as handed to durable storage
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredLift {
    pub id: Uuid,
    pub exercise: String,
    pub category: String,
    pub weight: f64,
    pub reps: u32,
    pub one_rep_max: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub owner_id: Option<u32>,
}

impl StoredLift {
    pub fn from_logged_set(set: &LoggedSet, owner_id: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise: set.exercise.clone(),
            category: set.category.clone(),
            weight: set.weight,
            reps: set.reps,
            one_rep_max: set.one_rep_max,
            date: set.date,
            owner_id,
        }
    }

    pub fn to_logged_set(&self) -> LoggedSet {
        LoggedSet {
            date: self.date,
            exercise: self.exercise.clone(),
            category: self.category.clone(),
            weight: self.weight,
            reps: self.reps,
            one_rep_max: self.one_rep_max,
        }
    }
}

/// Build an exercise table from stored rows, keeping their order
pub fn table_from_stored(lifts: &[StoredLift]) -> ExerciseTable {
    lifts.iter().map(StoredLift::to_logged_set).collect()
}

/// Sink trait for persisting logged sets
pub trait LiftSink {
    fn append(&mut self, lift: &StoredLift) -> Result<()>;
}

/// JSONL-based lift sink with file locking
pub struct JsonlLiftSink {
    path: PathBuf,
}

impl JsonlLiftSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl LiftSink for JsonlLiftSink {
    fn append(&mut self, lift: &StoredLift) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(lift)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended lift {} to {:?}", lift.id, self.path);
        Ok(())
    }
}

/// Read all stored lifts from a JSONL file
///
/// A missing file reads as empty. Malformed lines are logged and skipped.
pub fn read_lifts(path: &Path) -> Result<Vec<StoredLift>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut lifts = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<StoredLift>(&line) {
            Ok(lift) => lifts.push(lift),
            Err(e) => {
                tracing::warn!("Failed to parse lift at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} lifts from {:?}", lifts.len(), path);
    Ok(lifts)
}
