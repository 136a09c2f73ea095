//! Writing fields to point-list files.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use grid_window::{Grid, GridValue};
use ndarray::{ArrayBase, Data, Ix2};
use tracing::debug;

use crate::error::{PointListError, Result};
use crate::record::point_records;

/// A field of a grid and the file it is exported to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub field: String,
    pub path: PathBuf,
}

impl ExportTarget {
    pub fn new(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: field.into(),
            path: path.into(),
        }
    }
}

/// Write one field in point-list format.
///
/// Emits `nx` and `ny` on their own lines, then one `x y value` line per
/// cell with columns as the outer loop and rows as the inner loop.
pub fn write_point_list<W, T, S>(
    mut out: W,
    x: &[f64],
    y: &[f64],
    data: &ArrayBase<S, Ix2>,
) -> Result<()>
where
    W: Write,
    T: Copy + Display,
    S: Data<Elem = T>,
{
    let expected = (y.len(), x.len());
    if data.dim() != expected {
        return Err(PointListError::ShapeMismatch {
            expected,
            actual: data.dim(),
        });
    }

    writeln!(out, "{}", x.len())?;
    writeln!(out, "{}", y.len())?;
    for record in point_records(x, y, data) {
        writeln!(out, "{}", record)?;
    }
    out.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write one field to it.
///
/// The file is written in place; an error part way through leaves a
/// truncated file behind.
pub fn export<T, S>(path: &Path, x: &[f64], y: &[f64], data: &ArrayBase<S, Ix2>) -> Result<()>
where
    T: Copy + Display,
    S: Data<Elem = T>,
{
    let file = File::create(path)?;
    write_point_list(BufWriter::new(file), x, y, data)?;

    debug!(
        path = %path.display(),
        nx = x.len(),
        ny = y.len(),
        "Wrote point list"
    );
    Ok(())
}

/// Export several fields of one grid, each to its own file.
///
/// Every file is written from the same axis vectors, so the coordinate text
/// is identical across files. All targets are checked before any file is
/// created.
pub fn export_fields<T: GridValue>(grid: &Grid<T>, targets: &[ExportTarget]) -> Result<()> {
    let mut fields = Vec::with_capacity(targets.len());
    for target in targets {
        let field = grid
            .field(&target.field)
            .ok_or_else(|| PointListError::MissingField(target.field.clone()))?;
        if field.data.dim() != grid.shape() {
            return Err(PointListError::ShapeMismatch {
                expected: grid.shape(),
                actual: field.data.dim(),
            });
        }
        fields.push((field, &target.path));
    }

    for (field, path) in fields {
        export(path, &grid.x, &grid.y, &field.data)?;
    }
    Ok(())
}
