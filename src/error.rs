//! Error types for loading, filtering and exporting patient records.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal error raised while loading a dataset. There is no partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the Parquet reader.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error converting Arrow arrays.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// File format not supported.
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the source.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// A cell could not be parsed or is out of range.
    #[error("row {row}, column '{column}': {message}")]
    InvalidValue {
        row: usize,
        column: String,
        message: String,
    },

    /// Structurally broken input (wrong shape, duplicate headers, ...).
    #[error("Malformed data: {0}")]
    Malformed(String),

    /// The source parsed but contains no records.
    #[error("dataset contains no records")]
    Empty,
}

/// Filter criteria that can never be handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCriteria {
    #[error("invalid {dimension} range: {start} > {end}")]
    InvertedRange {
        dimension: &'static str,
        start: String,
        end: String,
    },
}

/// Error writing the filtered view to a delimited file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("flushing export buffer: {0}")]
    Flush(#[source] std::io::Error),
}
