//! Solver input files for the Robin-method basal friction inversion.
//!
//! The solver reads a `.sif` document whose grammar belongs to the solver;
//! this crate only fills in the run parameters:
//!
//! - the Tikhonov regularization coefficient (`$Lambda`)
//! - the glacier name, which selects the mesh database
//! - the maximum number of steady-state (optimization) iterations
//!
//! # Example
//!
//! ```ignore
//! use sif_template::SifParameters;
//!
//! let params = SifParameters::from_name("helheim")?.with_max_iterations(80);
//! params.write(&SifParameters::default_path(params.glacier))?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ice_common::{Glacier, ParseError};
use thiserror::Error;
use tracing::info;

const TEMPLATE: &str = include_str!("../templates/robin_beta.sif");

/// Default Tikhonov regularization coefficient.
pub const DEFAULT_REGULARIZATION: f64 = 1.0e10;

/// Default number of optimization iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Errors that can occur while generating a solver input file.
#[derive(Error, Debug)]
pub enum SifError {
    #[error(transparent)]
    UnknownGlacier(#[from] ParseError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for SIF generation.
pub type Result<T> = std::result::Result<T, SifError>;

/// Run parameters substituted into the template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SifParameters {
    pub glacier: Glacier,
    pub regularization: f64,
    pub max_iterations: u32,
}

impl SifParameters {
    /// Parameters for `glacier` with the default regularization and
    /// iteration count.
    pub fn new(glacier: Glacier) -> Self {
        Self {
            glacier,
            regularization: DEFAULT_REGULARIZATION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Parameters for a glacier given by name.
    ///
    /// Fails with [`SifError::UnknownGlacier`] unless the name is one of
    /// `helheim`, `jakobshavn` or `kangerd`.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse::<Glacier>()?))
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Conventional location of the SIF for `glacier`, relative to the
    /// working directory.
    pub fn default_path(glacier: Glacier) -> PathBuf {
        Self::default_path_in(Path::new("elmer"), glacier)
    }

    /// `dir/Robin_Beta_<Glacier>.sif`
    pub fn default_path_in(dir: &Path, glacier: Glacier) -> PathBuf {
        dir.join(format!("Robin_Beta_{}.sif", glacier.title()))
    }

    /// Render the solver input document.
    pub fn render(&self) -> String {
        TEMPLATE
            .replace("{{lambda}}", &format!("{:?}", self.regularization))
            .replace("{{glacier}}", self.glacier.as_str())
            .replace("{{max_iterations}}", &self.max_iterations.to_string())
    }

    /// Render and write the document to `path`, creating parent directories
    /// and overwriting any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |source| SifError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        fs::write(path, self.render()).map_err(write_err)?;

        info!(
            glacier = %self.glacier,
            regularization = self.regularization,
            max_iterations = self.max_iterations,
            path = %path.display(),
            "Wrote solver input file"
        );
        Ok(())
    }
}
