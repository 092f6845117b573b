use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bikeshare explorer.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// The requested city is not one of the supported datasets.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// The backing CSV file for a city could not be opened or read.
    #[error("Dataset for {city} is not available at {path}: {source}")]
    DatasetUnavailable {
        city: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row in a city CSV file could not be decoded.
    #[error("Malformed record in {path}: {message}")]
    DatasetCorrupt { path: PathBuf, message: String },

    /// A start-time string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A month or day value is outside the recognised vocabulary.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// An aggregation that requires trips received an empty table.
    #[error("No trips to aggregate for {0}")]
    EmptyDataset(&'static str),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the explorer crates.
pub type Result<T> = std::result::Result<T, ExploreError>;
