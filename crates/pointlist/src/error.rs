//! Error types for point-list files.

use thiserror::Error;

/// Errors that can occur while reading or writing point-list files.
#[derive(Error, Debug)]
pub enum PointListError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Field dimensions do not match the axes.
    #[error("field has shape {actual:?} but axes imply {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A header line is missing or not a count.
    #[error("invalid {0} header line")]
    InvalidHeader(&'static str),

    /// A record line could not be parsed.
    #[error("line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// The file ended before all records were read.
    #[error("expected {expected} records, found {found}")]
    Truncated { expected: usize, found: usize },

    /// A record's coordinate disagrees with the axis value established earlier.
    #[error("line {line}: {axis} coordinate does not match the grid axis")]
    InconsistentAxis { line: usize, axis: &'static str },

    /// A field named by an export target is not in the grid.
    #[error("field not found: {0}")]
    MissingField(String),
}

/// Result type for point-list operations.
pub type Result<T> = std::result::Result<T, PointListError>;
