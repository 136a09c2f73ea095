//! Error types for grid windowing.

use thiserror::Error;

use crate::window::BoundingBox;

/// Errors that can occur while windowing a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The field holds no cell that differs from the sentinel.
    #[error("grid contains no valid data")]
    EmptyDataset,

    /// A field's shape does not match the grid axes.
    #[error("field '{field}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        field: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The window extends past the edge of the array.
    #[error("bounding box {bbox:?} is outside a {rows}x{cols} grid")]
    OutOfRange {
        bbox: BoundingBox,
        rows: usize,
        cols: usize,
    },

    /// An axis is not strictly increasing or strictly decreasing.
    #[error("{axis} axis is not strictly monotonic at index {index}")]
    NonMonotonicAxis { axis: &'static str, index: usize },

    /// The requested field is not attached to the grid.
    #[error("field not found: {0}")]
    MissingField(String),
}

impl GridError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        field: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField(name.into())
    }
}

/// Result type for grid windowing operations.
pub type Result<T> = std::result::Result<T, GridError>;
