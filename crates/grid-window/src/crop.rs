//! Cropping co-registered fields to a bounding box.

use ndarray::s;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::types::{Field, Grid, GridValue};
use crate::window::{detect, BoundingBox};

/// A grid restricted to a bounding box.
///
/// Margin cells are kept even when they hold the sentinel. Every field has
/// the window's shape and the axes match the field dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedGrid<T> {
    grid: Grid<T>,
    bbox: BoundingBox,
}

impl<T: GridValue> CroppedGrid<T> {
    /// The cropped axes and fields.
    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    /// The window, in the index space of the source grid.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn x(&self) -> &[f64] {
        &self.grid.x
    }

    pub fn y(&self) -> &[f64] {
        &self.grid.y
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.grid.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.grid.field(name)
    }

    pub fn into_grid(self) -> Grid<T> {
        self.grid
    }
}

/// Crop every field of `grid`, and its axes, to `bbox`.
///
/// Fails with [`GridError::ShapeMismatch`] if the fields do not share the
/// axes' shape, and with [`GridError::OutOfRange`] if the window does not lie
/// inside the grid. The window is never clamped.
pub fn crop<T: GridValue>(grid: &Grid<T>, bbox: &BoundingBox) -> Result<CroppedGrid<T>> {
    grid.validate()?;

    let (rows, cols) = grid.shape();
    if !bbox.fits(rows, cols) {
        return Err(GridError::OutOfRange {
            bbox: *bbox,
            rows,
            cols,
        });
    }

    let (i0, i1) = (bbox.i_min as usize, bbox.i_max as usize);
    let (j0, j1) = (bbox.j_min as usize, bbox.j_max as usize);

    let fields = grid
        .fields
        .iter()
        .map(|field| {
            let window = field.data.slice(s![i0..=i1, j0..=j1]);
            Field::new(field.name.clone(), window.to_owned())
        })
        .collect();

    let cropped = Grid {
        x: grid.x[j0..=j1].to_vec(),
        y: grid.y[i0..=i1].to_vec(),
        fields,
    };

    debug!(
        from = ?(rows, cols),
        to = ?cropped.shape(),
        fields = cropped.fields.len(),
        "Cropped grid"
    );

    Ok(CroppedGrid {
        grid: cropped,
        bbox: *bbox,
    })
}

/// Detect the valid-data window on the `primary` field and crop every field
/// of the grid with that one window.
pub fn crop_to_valid<T: GridValue>(
    grid: &Grid<T>,
    primary: &str,
    sentinel: T,
    margin: usize,
) -> Result<CroppedGrid<T>> {
    let field = grid
        .field(primary)
        .ok_or_else(|| GridError::missing_field(primary))?;
    let bbox = detect(&field.data, sentinel, margin)?;
    crop(grid, &bbox)
}
