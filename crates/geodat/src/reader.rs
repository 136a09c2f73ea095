//! Reading and writing geodat grids.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ndarray::Array2;
use tracing::debug;

use crate::error::{GeodatError, Result};
use crate::header::GeodatHeader;

/// A single field decoded from a raw grid file, with its axes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Shape `(y.len(), x.len())`
    pub data: Array2<f32>,
}

/// Decodes raw grid files into axes and values.
pub trait GridReader {
    fn read(&self, path: &Path) -> Result<RawField>;
}

/// Path of the header that accompanies a data file: `name.vx` -> `name.vx.geodat`.
pub fn header_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".geodat");
    PathBuf::from(name)
}

/// [`GridReader`] for geodat files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodatReader;

impl GeodatReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse the header for `path`.
    pub fn read_header(&self, path: &Path) -> Result<GeodatHeader> {
        let header_path = header_path(path);
        let text =
            fs::read_to_string(&header_path).map_err(|e| GeodatError::io(&header_path, e))?;
        text.parse()
    }
}

impl GridReader for GeodatReader {
    fn read(&self, path: &Path) -> Result<RawField> {
        let header = self.read_header(path)?;

        let raw = fs::read(path).map_err(|e| GeodatError::io(path, e))?;
        if raw.len() != header.data_len() {
            return Err(GeodatError::SizeMismatch {
                path: path.to_path_buf(),
                expected: header.data_len(),
                actual: raw.len(),
            });
        }

        let mut buf = Bytes::from(raw);
        let mut values = Vec::with_capacity(header.nx * header.ny);
        while buf.has_remaining() {
            values.push(buf.get_f32());
        }

        let data = Array2::from_shape_vec((header.ny, header.nx), values)
            .map_err(|e| GeodatError::invalid_header(e.to_string()))?;

        debug!(
            path = %path.display(),
            nx = header.nx,
            ny = header.ny,
            "Read geodat grid"
        );

        Ok(RawField {
            x: header.x_axis(),
            y: header.y_axis(),
            data,
        })
    }
}

/// Write `data` and its header as a geodat grid at `path`.
pub fn write_geodat(path: &Path, header: &GeodatHeader, data: &Array2<f32>) -> Result<()> {
    let expected = (header.ny, header.nx);
    if data.dim() != expected {
        return Err(GeodatError::ShapeMismatch {
            expected,
            actual: data.dim(),
        });
    }

    let mut buf = BytesMut::with_capacity(header.data_len());
    // Iteration is in logical (row-major) order regardless of memory layout
    for value in data.iter() {
        buf.put_f32(*value);
    }

    fs::write(path, &buf).map_err(|e| GeodatError::io(path, e))?;
    let header_path = header_path(path);
    fs::write(&header_path, header.to_string()).map_err(|e| GeodatError::io(&header_path, e))?;
    Ok(())
}
