//! Error types for the partition transform
//!
//! Everything is fatal: no variant is retried or downgraded anywhere in the
//! pipeline. A failure aborts the run and surfaces to the caller unmodified.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while partitioning an input file
#[derive(Debug, Error)]
pub enum TransformError {
    /// Input file missing/unreadable, output directory or file not writable
    #[error("file access failed for '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required column absent, or of a type the transform cannot coerce
    #[error("schema error: {0}")]
    Schema(String),

    /// Failure while decoding or serializing columnar data
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl TransformError {
    /// Create a file access error, capturing the offending path
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

impl From<parquet::errors::ParquetError> for TransformError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for TransformError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Result type alias for TransformError
pub type Result<T> = std::result::Result<T, TransformError>;
