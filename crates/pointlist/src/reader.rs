//! Reading point-list files back into gridded fields.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use ndarray::{Array2, ShapeBuilder};
use tracing::debug;

use crate::error::{PointListError, Result};
use crate::record::{point_records, PointRecord};

/// A field parsed from a point-list file.
#[derive(Debug, Clone, PartialEq)]
pub struct PointList<T> {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub data: Array2<T>,
}

impl<T: Copy> PointList<T> {
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Records in file order.
    pub fn records(&self) -> impl Iterator<Item = PointRecord<T>> + '_ {
        point_records(&self.x, &self.y, &self.data)
    }
}

/// Parse a point-list stream.
///
/// The first column's records establish the `y` axis and each column's first
/// record its `x` value; every later record must repeat those coordinates
/// exactly. Storage grows with the records actually read, never with the
/// header counts alone.
pub fn read_point_list<T, R>(reader: R) -> Result<PointList<T>>
where
    T: FromStr + Copy,
    R: BufRead,
{
    let mut lines = reader.lines().enumerate();

    let nx = read_count(&mut lines, "nx")?;
    let ny = read_count(&mut lines, "ny")?;
    let expected = nx
        .checked_mul(ny)
        .filter(|n| *n <= isize::MAX as usize)
        .ok_or(PointListError::InvalidHeader("ny"))?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    // Column-major, as in the file
    let mut values = Vec::new();
    let mut found = 0;

    for (index, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if found == expected {
            return Err(PointListError::InvalidRecord {
                line: index + 1,
                message: format!("unexpected record after {} records", expected),
            });
        }

        let (xv, yv, value) = parse_record::<T>(&line, index + 1)?;
        let (j, i) = (found / ny, found % ny);

        if i == 0 {
            x.push(xv);
        } else if xv.to_bits() != x[j].to_bits() {
            return Err(PointListError::InconsistentAxis {
                line: index + 1,
                axis: "x",
            });
        }

        if j == 0 {
            y.push(yv);
        } else if yv.to_bits() != y[i].to_bits() {
            return Err(PointListError::InconsistentAxis {
                line: index + 1,
                axis: "y",
            });
        }

        values.push(value);
        found += 1;
    }

    if found != expected {
        return Err(PointListError::Truncated { expected, found });
    }

    let data = Array2::from_shape_vec((ny, nx).f(), values)
        .map_err(|_| PointListError::InvalidHeader("ny"))?;
    Ok(PointList { x, y, data })
}

/// Open and parse a point-list file.
pub fn read_point_list_file<T>(path: &Path) -> Result<PointList<T>>
where
    T: FromStr + Copy,
{
    let file = File::open(path)?;
    let list = read_point_list(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        nx = list.x.len(),
        ny = list.y.len(),
        "Read point list"
    );
    Ok(list)
}

fn read_count<I>(lines: &mut I, name: &'static str) -> Result<usize>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let (_, line) = lines.next().ok_or(PointListError::InvalidHeader(name))?;
    line?
        .trim()
        .parse()
        .map_err(|_| PointListError::InvalidHeader(name))
}

fn parse_record<T: FromStr>(line: &str, number: usize) -> Result<(f64, f64, T)> {
    let invalid = |message: &str| PointListError::InvalidRecord {
        line: number,
        message: message.to_string(),
    };

    let mut parts = line.split_whitespace();
    let (Some(x), Some(y), Some(value), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected three values"));
    };

    let x = x.parse::<f64>().map_err(|_| invalid("invalid x coordinate"))?;
    let y = y.parse::<f64>().map_err(|_| invalid("invalid y coordinate"))?;
    let value = value.parse::<T>().map_err(|_| invalid("invalid value"))?;
    Ok((x, y, value))
}
