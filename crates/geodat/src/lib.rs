//! Geodat grid files.
//!
//! A geodat grid is a pair of files: the raw data (`name.vx`, `name.ey`,
//! `dem13Mar.smooth`, ...) holding `nx * ny` big-endian `f32` values in
//! row-major order, and a small text header next to it (`name.vx.geodat`)
//! giving the grid size, origin and pixel size:
//!
//! ```text
//! # 2
//! ; Image size (pixels) nx ny
//! 1134 1212
//! ; Image origin (km) x0 y0
//! -205.000 -2275.000
//! ; Pixel size (m) deltaX deltaY
//! 100.00 100.00
//! &
//! ```

pub mod error;
pub mod header;
pub mod reader;

pub use error::{GeodatError, Result};
pub use header::GeodatHeader;
pub use reader::{header_path, write_geodat, GeodatReader, GridReader, RawField};
