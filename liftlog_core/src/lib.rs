#![forbid(unsafe_code)]

//! Core domain model and analytics for the Liftlog system.
//!
//! This crate provides:
//! - Domain types (logged sets, bodyweight measurements, tables)
//! - Strength metrics (estimated 1RM, strength score)
//! - Exercise category catalog
//! - CSV ingestion
//! - Period maxima, composite totals and score series
//! - Append/remove on exercise tables
//! - Persistence sink and CSV export

pub mod types;
pub mod error;
pub mod metrics;
pub mod catalog;
pub mod period;
pub mod ingest;
pub mod aggregate;
pub mod mutation;
pub mod config;
pub mod logging;
pub mod sink;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use period::Period;
pub use catalog::{exercise_category, CategoryCatalog, CATEGORY_NOT_FOUND};
pub use metrics::{estimate_one_rep_max, strength_score};
pub use ingest::{load_bodyweight_csv, load_lifts_csv};
pub use aggregate::{
    composite_total, composite_total_with, period_maxima, strength_score_series,
    BodyweightSource, PeriodMaxima, SeriesSource, TotalMode,
};
pub use mutation::{add_exercise, add_exercise_with, remove_exercise};
pub use config::Config;
pub use sink::{JsonlLiftSink, LiftSink, StoredLift};
