//! Core types: numeric cell values, named fields and grids.

use std::fmt;

use ndarray::Array2;

use crate::error::{GridError, Result};

/// A numeric cell type that can be compared against a "no data" sentinel.
pub trait GridValue: Copy + PartialEq + fmt::Display + fmt::Debug {
    /// Returns true if `self` is the sentinel value.
    ///
    /// Floats compare bit patterns, so a NaN sentinel matches NaN cells and
    /// there is no tolerance.
    fn is_missing(self, sentinel: Self) -> bool;
}

impl GridValue for f32 {
    fn is_missing(self, sentinel: Self) -> bool {
        self.to_bits() == sentinel.to_bits()
    }
}

impl GridValue for f64 {
    fn is_missing(self, sentinel: Self) -> bool {
        self.to_bits() == sentinel.to_bits()
    }
}

impl GridValue for i16 {
    fn is_missing(self, sentinel: Self) -> bool {
        self == sentinel
    }
}

impl GridValue for i32 {
    fn is_missing(self, sentinel: Self) -> bool {
        self == sentinel
    }
}

/// A named 2-D field of shape `(ny, nx)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    pub name: String,
    pub data: Array2<T>,
}

impl<T> Field<T> {
    pub fn new(name: impl Into<String>, data: Array2<T>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Coordinate axes plus the fields sampled on them.
///
/// Row `i` of every field lies at `y[i]`, column `j` at `x[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub fields: Vec<Field<T>>,
}

impl<T: GridValue> Grid<T> {
    /// Create a grid with no fields attached.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            fields: Vec::new(),
        }
    }

    /// Attach a field. Shapes are checked by [`Grid::validate`].
    pub fn with_field(mut self, name: impl Into<String>, data: Array2<T>) -> Self {
        self.fields.push(Field::new(name, data));
        self
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Field shape implied by the axes, `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check axis monotonicity and that every field matches the axes.
    pub fn validate(&self) -> Result<()> {
        check_monotonic("x", &self.x)?;
        check_monotonic("y", &self.y)?;

        let expected = self.shape();
        for field in &self.fields {
            if field.data.dim() != expected {
                return Err(GridError::shape_mismatch(
                    field.name.clone(),
                    expected,
                    field.data.dim(),
                ));
            }
        }
        Ok(())
    }
}

fn check_monotonic(axis: &'static str, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Ok(());
    }

    let increasing = values[1] > values[0];
    for (index, pair) in values.windows(2).enumerate() {
        let ok = if increasing {
            pair[1] > pair[0]
        } else {
            pair[1] < pair[0]
        };
        if !ok {
            return Err(GridError::NonMonotonicAxis {
                axis,
                index: index + 1,
            });
        }
    }
    Ok(())
}
