//! Error types for geodat files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing geodat grids.
#[derive(Error, Debug)]
pub enum GeodatError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid geodat header: {0}")]
    InvalidHeader(String),

    #[error("data file {path} has {actual} bytes, header implies {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("field has shape {actual:?}, header implies {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl GeodatError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidHeader error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }
}

/// Result type for geodat operations.
pub type Result<T> = std::result::Result<T, GeodatError>;
