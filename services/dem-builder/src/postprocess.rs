//! Filling small gaps in exported velocity fields.
//!
//! A missing cell with enough valid 4-neighbours takes their mean. Each pass
//! reads only the previous pass's values, so the result does not depend on
//! traversal order. Passes stop when nothing changes or the pass limit is hit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_window::GridValue;
use ndarray::Array2;
use pointlist::{export, read_point_list_file};
use tracing::{debug, info};

use crate::config::GapFillConfig;

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, Copy)]
pub struct GapFiller {
    sentinel: f32,
    min_neighbours: usize,
    max_passes: usize,
}

impl GapFiller {
    pub fn new(sentinel: f32, config: GapFillConfig) -> Self {
        Self {
            sentinel,
            min_neighbours: config.min_neighbours,
            max_passes: config.max_passes,
        }
    }

    /// Fill gaps in place, returning the number of cells filled.
    pub fn fill(&self, data: &mut Array2<f32>) -> usize {
        let (rows, cols) = data.dim();
        let mut total = 0;

        for pass in 0..self.max_passes {
            let previous = data.clone();
            let mut filled = 0;

            for ((i, j), value) in data.indexed_iter_mut() {
                if !value.is_missing(self.sentinel) {
                    continue;
                }

                let mut sum = 0.0f64;
                let mut count = 0;
                for (di, dj) in NEIGHBOURS {
                    let (ni, nj) = (i as isize + di, j as isize + dj);
                    if ni < 0 || nj < 0 || ni >= rows as isize || nj >= cols as isize {
                        continue;
                    }
                    let neighbour = previous[[ni as usize, nj as usize]];
                    if !neighbour.is_missing(self.sentinel) {
                        sum += neighbour as f64;
                        count += 1;
                    }
                }

                if count >= self.min_neighbours {
                    *value = (sum / count as f64) as f32;
                    filled += 1;
                }
            }

            debug!(pass = pass + 1, filled = filled, "Gap filling pass");
            total += filled;
            if filled == 0 {
                break;
            }
        }

        total
    }

    /// Fill gaps in a point-list file and rewrite it in place.
    pub fn fill_file(&self, path: &Path) -> Result<usize> {
        self.fill_files(&[path.to_path_buf()])
    }

    /// Fill gaps in several point-list files as one unit.
    ///
    /// Every file is read and filled before any is rewritten. Rewrites go to
    /// `<file>.filling` first and are renamed into place once all of them
    /// were written, so a failure leaves the original files untouched.
    pub fn fill_files(&self, paths: &[PathBuf]) -> Result<usize> {
        let mut lists = Vec::with_capacity(paths.len());
        let mut total = 0;
        for path in paths {
            let mut list = read_point_list_file::<f32>(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filled = self.fill(&mut list.data);
            info!(path = %path.display(), filled = filled, "Filled velocity gaps");
            total += filled;
            lists.push((path, list));
        }

        if total == 0 {
            return Ok(0);
        }

        let mut staged = Vec::with_capacity(lists.len());
        for (path, list) in &lists {
            let staging = staging_path(path);
            if let Err(e) = export(&staging, &list.x, &list.y, &list.data) {
                fs::remove_file(&staging).ok();
                for (_, written) in &staged {
                    fs::remove_file(written).ok();
                }
                return Err(e).with_context(|| format!("Failed to rewrite {}", path.display()));
            }
            staged.push((*path, staging));
        }

        for (path, staging) in &staged {
            fs::rename(staging, path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
        }
        Ok(total)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".filling");
    PathBuf::from(name)
}
