//! Error types for PowerWatch data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors while loading build inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The CSV reader failed (unreadable file, invalid UTF-8, broken quoting).
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required column not found in the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Invalid value in a field that must parse.
    #[error("invalid {field} value '{value}' in {path} (row {row})")]
    InvalidValue {
        field: String,
        value: String,
        path: PathBuf,
        row: u64,
    },

    /// The country table lists the same country twice.
    #[error("duplicate country '{name}' in {path}")]
    DuplicateCountry { name: String, path: PathBuf },
}

impl IngestError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
