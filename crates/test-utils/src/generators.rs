//! Test data generators for creating synthetic velocity-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use std::ops::Range;

use ndarray::Array2;

/// The "no data" value used by the velocity mosaics.
pub const SENTINEL: f32 = -2.0e9;

/// Creates a field that is [`SENTINEL`] everywhere except inside the given
/// row and column ranges, which hold `col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::{sentinel_field_with_block, SENTINEL};
///
/// let field = sentinel_field_with_block(5, 5, 1..3, 1..3);
/// assert_eq!(field[[0, 0]], SENTINEL);
/// assert_eq!(field[[2, 1]], 1002.0);
/// ```
pub fn sentinel_field_with_block(
    rows: usize,
    cols: usize,
    block_rows: Range<usize>,
    block_cols: Range<usize>,
) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(row, col)| {
        if block_rows.contains(&row) && block_cols.contains(&col) {
            (col * 1000 + row) as f32
        } else {
            SENTINEL
        }
    })
}

/// Creates a velocity-error-like field: positive values inside the block,
/// [`SENTINEL`] outside.
pub fn error_field_with_block(
    rows: usize,
    cols: usize,
    block_rows: Range<usize>,
    block_cols: Range<usize>,
) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(row, col)| {
        if block_rows.contains(&row) && block_cols.contains(&col) {
            5.0 + 0.25 * (row + col) as f32
        } else {
            SENTINEL
        }
    })
}

/// Creates a regularly spaced coordinate axis.
///
/// # Example
///
/// ```
/// use test_utils::linear_axis;
///
/// assert_eq!(linear_axis(-205000.0, 100.0, 3), vec![-205000.0, -204900.0, -204800.0]);
/// ```
pub fn linear_axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|k| start + step * k as f64).collect()
}

/// Creates a surface-elevation-like field in metres.
///
/// Elevation rises linearly away from the first column, like a glacier
/// surface sloping down towards its terminus.
pub fn create_elevation_field(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(row, col)| {
        50.0 + 12.5 * col as f32 + 0.5 * row as f32
    })
}
