//! Error types for the calbank_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for calbank_core operations
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

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The supplied date falls outside the goal's week
    #[error("Date {date} is outside the week starting {week_start}")]
    InvalidDateRange {
        date: chrono::NaiveDate,
        week_start: chrono::NaiveDate,
    },

    /// The weekly goal has no usable allowance
    #[error("Weekly goal has a non-positive allowance ({0} kcal)")]
    EmptyGoal(i32),

    /// Store/state management error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
