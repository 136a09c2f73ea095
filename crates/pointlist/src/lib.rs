//! Point-list files for the ice-flow solver's gridded data importer.
//!
//! A point-list file describes one field on a regular grid:
//!
//! ```text
//! nx
//! ny
//! x[0] y[0] field[0, 0]
//! x[0] y[1] field[1, 0]
//! ...
//! x[0] y[ny-1] field[ny-1, 0]
//! x[1] y[0] field[0, 1]
//! ...
//! ```
//!
//! Columns form the outer loop and rows the inner loop. The importer relies
//! on this order, so fields that share axes (velocity components and their
//! errors) are written with identical coordinate text and can be paired up
//! again by position.

pub mod error;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{PointListError, Result};
pub use reader::{read_point_list, read_point_list_file, PointList};
pub use record::{point_records, PointRecord};
pub use writer::{export, export_fields, write_point_list, ExportTarget};
