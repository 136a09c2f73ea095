//! The `.geodat` text header.

use std::fmt;
use std::str::FromStr;

use crate::error::{GeodatError, Result};

/// Grid geometry from a `.geodat` header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodatHeader {
    /// Number of columns
    pub nx: usize,
    /// Number of rows
    pub ny: usize,
    /// Origin x coordinate in kilometres
    pub x0_km: f64,
    /// Origin y coordinate in kilometres
    pub y0_km: f64,
    /// Pixel width in metres
    pub dx: f64,
    /// Pixel height in metres
    pub dy: f64,
}

impl GeodatHeader {
    /// Column coordinates in metres.
    pub fn x_axis(&self) -> Vec<f64> {
        let x0 = self.x0_km * 1000.0;
        (0..self.nx).map(|j| x0 + self.dx * j as f64).collect()
    }

    /// Row coordinates in metres.
    pub fn y_axis(&self) -> Vec<f64> {
        let y0 = self.y0_km * 1000.0;
        (0..self.ny).map(|i| y0 + self.dy * i as f64).collect()
    }

    /// Size of the matching data file in bytes, `None` if it overflows.
    pub fn checked_data_len(&self) -> Option<usize> {
        self.nx
            .checked_mul(self.ny)?
            .checked_mul(std::mem::size_of::<f32>())
    }

    /// Size of the matching data file in bytes.
    ///
    /// Saturates for sizes no file can have; parsed headers never overflow.
    pub fn data_len(&self) -> usize {
        self.checked_data_len().unwrap_or(usize::MAX)
    }
}

impl FromStr for GeodatHeader {
    type Err = GeodatError;

    fn from_str(s: &str) -> Result<Self> {
        // Comment (#, ;) and terminator (&) lines carry no values
        let mut rows = s.lines().map(str::trim).filter(|line| {
            !(line.is_empty()
                || line.starts_with('#')
                || line.starts_with(';')
                || line.starts_with('&'))
        });

        let (nx, ny) = pair::<usize>(rows.next(), "image size")?;
        let (x0_km, y0_km) = pair::<f64>(rows.next(), "image origin")?;
        let (dx, dy) = pair::<f64>(rows.next(), "pixel size")?;

        if dx == 0.0 || dy == 0.0 {
            return Err(GeodatError::invalid_header("pixel size must be non-zero"));
        }

        let header = Self {
            nx,
            ny,
            x0_km,
            y0_km,
            dx,
            dy,
        };
        if header.checked_data_len().is_none() {
            return Err(GeodatError::invalid_header(format!(
                "image size {} x {} is too large",
                nx, ny
            )));
        }
        Ok(header)
    }
}

impl fmt::Display for GeodatHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# 2")?;
        writeln!(f, "; Image size (pixels) nx ny")?;
        writeln!(f, "{} {}", self.nx, self.ny)?;
        writeln!(f, "; Image origin (km) x0 y0")?;
        writeln!(f, "{} {}", self.x0_km, self.y0_km)?;
        writeln!(f, "; Pixel size (m) deltaX deltaY")?;
        writeln!(f, "{} {}", self.dx, self.dy)?;
        writeln!(f, "&")
    }
}

fn pair<T: FromStr>(line: Option<&str>, what: &str) -> Result<(T, T)> {
    let line = line.ok_or_else(|| GeodatError::invalid_header(format!("missing {}", what)))?;
    let mut values = line.split_whitespace().map(str::parse::<T>);
    match (values.next(), values.next()) {
        (Some(Ok(a)), Some(Ok(b))) => Ok((a, b)),
        _ => Err(GeodatError::invalid_header(format!(
            "invalid {} line '{}'",
            what, line
        ))),
    }
}
