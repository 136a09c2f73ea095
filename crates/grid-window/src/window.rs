//! Bounding box detection over sentinel-masked fields.

use ndarray::{ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::types::GridValue;

/// Margin, in cells, kept around the measured region of a velocity grid.
pub const DEFAULT_MARGIN: usize = 2;

/// An inclusive index window `[i_min, i_max] x [j_min, j_max]`.
///
/// `i` indexes rows (the y axis) and `j` indexes columns (the x axis). The
/// indices are signed because margin expansion is never clamped: a window
/// detected near the edge of an array can start before row 0 or end past the
/// last column, and it is up to [`crate::crop`] to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub i_min: isize,
    pub i_max: isize,
    pub j_min: isize,
    pub j_max: isize,
}

impl BoundingBox {
    pub fn new(i_min: isize, i_max: isize, j_min: isize, j_max: isize) -> Self {
        Self {
            i_min,
            i_max,
            j_min,
            j_max,
        }
    }

    /// Number of rows covered, zero for an inverted window.
    pub fn rows(&self) -> usize {
        (self.i_max - self.i_min + 1).max(0) as usize
    }

    /// Number of columns covered, zero for an inverted window.
    pub fn cols(&self) -> usize {
        (self.j_max - self.j_min + 1).max(0) as usize
    }

    /// Shape of a field cropped to this window, `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Grow the window by `margin` cells on every side, without clamping.
    pub fn expand(&self, margin: usize) -> Self {
        let m = margin as isize;
        Self {
            i_min: self.i_min - m,
            i_max: self.i_max + m,
            j_min: self.j_min - m,
            j_max: self.j_max + m,
        }
    }

    /// Check that the window lies inside an array of `rows x cols`.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.i_min >= 0
            && self.j_min >= 0
            && self.i_min <= self.i_max
            && self.j_min <= self.j_max
            && (self.i_max as usize) < rows
            && (self.j_max as usize) < cols
    }

    /// Check if a cell lies inside the window.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let (i, j) = (i as isize, j as isize);
        i >= self.i_min && i <= self.i_max && j >= self.j_min && j <= self.j_max
    }
}

/// Find the window enclosing every non-sentinel cell of `field`, grown by
/// `margin` cells on each side.
///
/// The margin is not clamped to the array bounds. Callers must make sure the
/// data leave at least `margin` cells of padding, otherwise the returned box
/// has negative or out-of-range indices and cropping with it fails.
///
/// Returns [`GridError::EmptyDataset`] if every cell equals the sentinel.
pub fn detect<T, S>(field: &ArrayBase<S, Ix2>, sentinel: T, margin: usize) -> Result<BoundingBox>
where
    T: GridValue,
    S: Data<Elem = T>,
{
    let mut tight: Option<BoundingBox> = None;

    for ((i, j), &value) in field.indexed_iter() {
        if value.is_missing(sentinel) {
            continue;
        }
        let (i, j) = (i as isize, j as isize);
        tight = Some(match tight {
            None => BoundingBox::new(i, i, j, j),
            Some(b) => BoundingBox::new(
                b.i_min.min(i),
                b.i_max.max(i),
                b.j_min.min(j),
                b.j_max.max(j),
            ),
        });
    }

    let tight = tight.ok_or(GridError::EmptyDataset)?;
    let bbox = tight.expand(margin);

    debug!(
        rows = field.nrows(),
        cols = field.ncols(),
        ?tight,
        ?bbox,
        margin,
        "Detected valid data window"
    );

    Ok(bbox)
}
