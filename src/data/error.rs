use std::path::PathBuf;

use thiserror::Error;

/// Reasons a measurement file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("malformed parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow conversion")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

impl LoadError {
    /// Whether the failure means the input file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}
