//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A record is missing a required field or carries a malformed value
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A date string could not be parsed
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// Strength score denominator is zero, negative or not finite
    #[error("Degenerate strength score for bodyweight {bodyweight}: denominator {denominator}")]
    DegenerateScore { bodyweight: f64, denominator: f64 },

    /// Unrecognised period alias
    #[error("Unknown period alias: {0:?}")]
    UnknownPeriod(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),
}
