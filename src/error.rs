//! Error types for the immunocohort library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CohortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cell count '{value}' for sample '{sample}', population '{population}'")]
    InvalidCount {
        sample: String,
        population: String,
        value: String,
    },

    #[error("Duplicate measurement for sample '{sample}', population '{population}'")]
    DuplicateMeasurement { sample: String, population: String },

    #[error("Store not found at {db:?} and no source file given to initialize it")]
    StoreUnavailable { db: PathBuf },

    #[error("Empty data: {0}")]
    EmptyData(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CohortError>;
