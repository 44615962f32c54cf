use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the order dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input (bad quoting, bad UTF-8, wrong field count).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A data row could not be mapped onto an order line.
    #[error("Invalid row at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    /// A purchase timestamp did not match any recognised format.
    #[error("Invalid timestamp at line {line}: {value}")]
    TimestampParse { line: u64, value: String },

    /// The lower bound of a date range lies after its upper bound.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// No dataset file could be located.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// Persisted settings could not be serialised.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
