//! Crate-wide error type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building window metadata or writing report files.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Array dimensions inconsistent across inputs (e.g. probability tensor
    /// window count vs. metadata rows, or a per-SNP length shorter than the
    /// window-tiled length).
    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// Malformed input values (non-increasing position columns, empty
    /// genetic map, mismatched column lengths).
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Output file could not be created or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results using ReportError
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
