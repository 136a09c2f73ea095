//! Grid windowing for sparse velocity mosaics.
//!
//! Raw velocity grids cover a much larger area than the glacier they were
//! measured on; everything outside the measured region holds a sentinel
//! "no data" value. This crate finds the smallest index window enclosing the
//! measured cells and crops every co-registered field of a grid to it:
//!
//! ```text
//! Grid { x, y, [vx, vy, ex, ey] }
//!      │
//!      ▼
//! detect(vx, sentinel, margin) ──► BoundingBox (computed once)
//!      │
//!      ▼
//! crop(grid, bbox) ──► CroppedGrid { x', y', [vx', vy', ex', ey'] }
//! ```
//!
//! The margin is applied without clamping. A window that runs off the edge of
//! the array is reported by [`crop`] as [`GridError::OutOfRange`].
//!
//! # Example
//!
//! ```ignore
//! use grid_window::{crop_to_valid, Grid, DEFAULT_MARGIN};
//!
//! let grid = Grid::new(x, y).with_field("vx", vx).with_field("vy", vy);
//! let cropped = crop_to_valid(&grid, "vx", -2.0e9, DEFAULT_MARGIN)?;
//! assert_eq!(cropped.field("vx").unwrap().data.dim(), cropped.grid().shape());
//! ```

pub mod crop;
pub mod error;
pub mod types;
pub mod window;

pub use crop::{crop, crop_to_valid, CroppedGrid};
pub use error::{GridError, Result};
pub use types::{Field, Grid, GridValue};
pub use window::{detect, BoundingBox, DEFAULT_MARGIN};
