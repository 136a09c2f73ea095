//! Per-glacier build pipeline.
//!
//! Each glacier gets up to four datasets, processed in order:
//!
//! ```text
//! velocity     read vx/vy/ex/ey -> detect window on vx -> crop -> export
//! bed          fetch zbDEM.xy
//! surface      fetch zsDEM.xy, or read a local grid and export it uncropped
//! postprocess  gap-fill UDEM.xy and VDEM.xy
//! ```
//!
//! A dataset whose output files already exist is skipped. A failing dataset
//! is recorded in the [`RunReport`] and the remaining datasets still run.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geodat::{GridReader, RawField};
use grid_window::{crop, detect, Grid};
use ice_common::{DemSource, Glacier};
use pointlist::{export, export_fields, ExportTarget};
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::postprocess::GapFiller;
use crate::retrieve::Retriever;

/// Raw-file extension and output file for each velocity field.
pub const VELOCITY_FIELDS: [(&str, &str); 4] = [
    ("vx", "UDEM.xy"),
    ("vy", "VDEM.xy"),
    ("ex", "EUDEM.xy"),
    ("ey", "EVDEM.xy"),
];

/// Field the crop window is detected on.
pub const PRIMARY_FIELD: &str = "vx";

pub const BED_FILE: &str = "zbDEM.xy";
pub const SURFACE_FILE: &str = "zsDEM.xy";

/// Velocity outputs that get gap-filled.
const GAP_FILLED: [&str; 2] = ["UDEM.xy", "VDEM.xy"];

/// Written once both velocity components have been gap-filled.
pub const GAP_FILL_MARKER: &str = ".gapfilled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Velocity,
    Bed,
    Surface,
    Postprocess,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Product::Velocity => "velocity",
            Product::Bed => "bed",
            Product::Surface => "surface",
            Product::Postprocess => "postprocess",
        };
        f.write_str(name)
    }
}

/// Progress of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    NotStarted,
    Skipped,
    Retrieved,
    Read,
    BoundingBoxComputed,
    Cropped,
    Exported,
    Done,
}

/// How a dataset finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Built,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFailure {
    pub glacier: Glacier,
    pub product: Product,
    pub error: String,
}

/// What happened to every dataset in a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub built: Vec<(Glacier, Product)>,
    pub skipped: Vec<(Glacier, Product)>,
    pub failed: Vec<DatasetFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[cfg(test)]
    pub fn outcome(&self, glacier: Glacier, product: Product) -> Option<Outcome> {
        if self.built.contains(&(glacier, product)) {
            Some(Outcome::Built)
        } else if self.skipped.contains(&(glacier, product)) {
            Some(Outcome::Skipped)
        } else {
            None
        }
    }

    fn record(&mut self, glacier: Glacier, product: Product, result: Result<Outcome>) {
        match result {
            Ok(Outcome::Built) => self.built.push((glacier, product)),
            Ok(Outcome::Skipped) => self.skipped.push((glacier, product)),
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(glacier = %glacier, product = %product, error = %message, "Dataset failed");
                self.failed.push(DatasetFailure {
                    glacier,
                    product,
                    error: message,
                });
            }
        }
    }
}

fn transition(glacier: Glacier, product: Product, state: DatasetState) {
    debug!(glacier = %glacier, product = %product, state = ?state, "Dataset state");
}

/// Builds every configured dataset.
pub struct Pipeline<R, G> {
    config: BuilderConfig,
    source: DemSource,
    retriever: R,
    reader: G,
}

impl<R: Retriever, G: GridReader> Pipeline<R, G> {
    pub fn new(config: BuilderConfig, source: DemSource, retriever: R, reader: G) -> Self {
        Self {
            config,
            source,
            retriever,
            reader,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Run every stage for every configured glacier.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        for glacier in self.config.glaciers() {
            let dir = self.config.glacier_dir(glacier);
            if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                report.record(
                    glacier,
                    Product::Velocity,
                    Err(anyhow!(e).context(format!("creating {}", dir.display()))),
                );
                continue;
            }

            if let Some(prefix) = self.config.velocity.get(&glacier) {
                report.record(
                    glacier,
                    Product::Velocity,
                    self.build_velocity(glacier, prefix),
                );
            }

            if self.config.bed.contains(&glacier) {
                report.record(glacier, Product::Bed, self.fetch_bed(glacier).await);
            }

            if self.config.remote_surface.contains(&glacier) {
                report.record(glacier, Product::Surface, self.fetch_surface(glacier).await);
            } else if let Some(name) = self.config.local_surface.get(&glacier) {
                report.record(glacier, Product::Surface, self.build_surface(glacier, name));
            }

            if self.config.postprocess.contains(&glacier) {
                report.record(glacier, Product::Postprocess, self.postprocess(glacier));
            }
        }

        info!(
            built = report.built.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Build run complete"
        );
        report
    }

    /// Crop the four velocity fields to the measured region and export them.
    pub fn build_velocity(&self, glacier: Glacier, prefix: &str) -> Result<Outcome> {
        let product = Product::Velocity;
        transition(glacier, product, DatasetState::NotStarted);

        let dir = self.config.glacier_dir(glacier);
        if VELOCITY_FIELDS
            .iter()
            .any(|(_, file)| dir.join(file).exists())
        {
            transition(glacier, product, DatasetState::Skipped);
            info!(glacier = %glacier, "Velocity data already exists, skipping");
            return Ok(Outcome::Skipped);
        }

        let grid = self.read_velocity(glacier, prefix)?;
        transition(glacier, product, DatasetState::Read);

        let primary = grid
            .field(PRIMARY_FIELD)
            .ok_or_else(|| anyhow!("missing {} field", PRIMARY_FIELD))?;
        let bbox = detect(&primary.data, self.config.sentinel, self.config.margin)
            .with_context(|| format!("detecting valid region of {} {}", glacier, PRIMARY_FIELD))?;
        transition(glacier, product, DatasetState::BoundingBoxComputed);
        debug!(glacier = %glacier, bbox = ?bbox, "Velocity window");

        let cropped = crop(&grid, &bbox).with_context(|| format!("cropping {} velocity", glacier))?;
        transition(glacier, product, DatasetState::Cropped);

        // Fresh exports have not been gap-filled yet
        let marker = dir.join(GAP_FILL_MARKER);
        if marker.exists() {
            std::fs::remove_file(&marker)
                .with_context(|| format!("removing {}", marker.display()))?;
        }

        let targets: Vec<ExportTarget> = VELOCITY_FIELDS
            .iter()
            .map(|(field, file)| ExportTarget::new(*field, dir.join(file)))
            .collect();
        export_fields(cropped.grid(), &targets)
            .with_context(|| format!("exporting {} velocity", glacier))?;
        transition(glacier, product, DatasetState::Exported);

        transition(glacier, product, DatasetState::Done);
        let (ny, nx) = bbox.shape();
        info!(glacier = %glacier, nx = nx, ny = ny, "Done making velocity data");
        Ok(Outcome::Built)
    }

    fn read_velocity(&self, glacier: Glacier, prefix: &str) -> Result<Grid<f32>> {
        let mut grid: Option<Grid<f32>> = None;

        for (ext, _) in VELOCITY_FIELDS {
            let path = self
                .config
                .source_path(glacier, &format!("{}.{}", prefix, ext));
            let RawField { x, y, data } = self
                .reader
                .read(&path)
                .with_context(|| format!("reading {}", path.display()))?;

            grid = Some(match grid {
                None => Grid::new(x, y).with_field(ext, data),
                Some(grid) => {
                    if grid.x != x || grid.y != y {
                        bail!(
                            "{} does not share the axes of {}.{}",
                            path.display(),
                            prefix,
                            PRIMARY_FIELD
                        );
                    }
                    grid.with_field(ext, data)
                }
            });
        }

        let grid = grid.ok_or_else(|| anyhow!("no velocity fields read"))?;
        grid.validate()?;
        Ok(grid)
    }

    /// Download the bed DEM for the selected source.
    pub async fn fetch_bed(&self, glacier: Glacier) -> Result<Outcome> {
        let url = self.config.bed_url(self.source, glacier);
        let dest = self.config.glacier_dir(glacier).join(BED_FILE);
        self.fetch(glacier, Product::Bed, &url, &dest).await
    }

    /// Download the surface DEM.
    pub async fn fetch_surface(&self, glacier: Glacier) -> Result<Outcome> {
        let url = self.config.surface_url(glacier);
        let dest = self.config.glacier_dir(glacier).join(SURFACE_FILE);
        self.fetch(glacier, Product::Surface, &url, &dest).await
    }

    async fn fetch(&self, glacier: Glacier, product: Product, url: &str, dest: &Path) -> Result<Outcome> {
        transition(glacier, product, DatasetState::NotStarted);

        if dest.exists() {
            transition(glacier, product, DatasetState::Skipped);
            info!(glacier = %glacier, product = %product, "Output already exists, skipping");
            return Ok(Outcome::Skipped);
        }

        self.retriever
            .fetch(url, dest)
            .await
            .with_context(|| format!("retrieving {} {} DEM", glacier, product))?;
        transition(glacier, product, DatasetState::Retrieved);

        transition(glacier, product, DatasetState::Done);
        info!(glacier = %glacier, product = %product, "Done making elevation data");
        Ok(Outcome::Built)
    }

    /// Export a local surface grid in full.
    pub fn build_surface(&self, glacier: Glacier, name: &str) -> Result<Outcome> {
        let product = Product::Surface;
        transition(glacier, product, DatasetState::NotStarted);

        let dest = self.config.glacier_dir(glacier).join(SURFACE_FILE);
        if dest.exists() {
            transition(glacier, product, DatasetState::Skipped);
            info!(glacier = %glacier, product = %product, "Output already exists, skipping");
            return Ok(Outcome::Skipped);
        }

        let path = self.config.source_path(glacier, name);
        let RawField { x, y, data } = self
            .reader
            .read(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        transition(glacier, product, DatasetState::Read);

        export(&dest, &x, &y, &data).with_context(|| format!("exporting {}", dest.display()))?;
        transition(glacier, product, DatasetState::Exported);

        transition(glacier, product, DatasetState::Done);
        info!(glacier = %glacier, nx = x.len(), ny = y.len(), "Done making surface elevation");
        Ok(Outcome::Built)
    }

    /// Gap-fill the exported velocity components.
    pub fn postprocess(&self, glacier: Glacier) -> Result<Outcome> {
        let product = Product::Postprocess;
        transition(glacier, product, DatasetState::NotStarted);

        let dir = self.config.glacier_dir(glacier);
        let marker = dir.join(GAP_FILL_MARKER);
        if marker.exists() {
            transition(glacier, product, DatasetState::Skipped);
            info!(glacier = %glacier, "Velocity data already gap-filled, skipping");
            return Ok(Outcome::Skipped);
        }

        let filler = GapFiller::new(self.config.sentinel, self.config.gap_fill);
        let paths: Vec<_> = GAP_FILLED.iter().map(|file| dir.join(file)).collect();
        let filled = filler
            .fill_files(&paths)
            .with_context(|| format!("gap-filling {} velocity", glacier))?;
        transition(glacier, product, DatasetState::Exported);

        std::fs::write(&marker, format!("{}\n", filled))
            .with_context(|| format!("writing {}", marker.display()))?;

        transition(glacier, product, DatasetState::Done);
        info!(glacier = %glacier, filled = filled, "Done post-processing velocity data");
        Ok(Outcome::Built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use geodat::{write_geodat, GeodatHeader, GeodatReader};
    use ndarray::Array2;
    use pointlist::{read_point_list_file, PointList};
    use test_utils::{
        assert_approx_eq, error_field_with_block, sentinel_field_with_block, temp_test_dir, SENTINEL,
    };

    use crate::retrieve::RetrievalError;

    const PREFIX: &str = "TSX_test";

    /// Writes the URL into the destination file.
    #[derive(Clone, Default)]
    struct FakeRetriever {
        urls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Retriever for FakeRetriever {
        async fn fetch(&self, url: &str, dest: &Path) -> Result<(), RetrievalError> {
            self.urls.lock().unwrap().push(url.to_string());
            std::fs::write(dest, url).map_err(|source| RetrievalError::Io {
                path: dest.to_path_buf(),
                source,
            })
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn fetch(&self, url: &str, _dest: &Path) -> Result<(), RetrievalError> {
            Err(RetrievalError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn header(nx: usize, ny: usize) -> GeodatHeader {
        GeodatHeader {
            nx,
            ny,
            x0_km: -205.0,
            y0_km: -2275.0,
            dx: 100.0,
            dy: 100.0,
        }
    }

    fn write_grid(dir: &Path, name: &str, data: &Array2<f32>) {
        let (ny, nx) = data.dim();
        std::fs::create_dir_all(dir).unwrap();
        write_geodat(&dir.join(name), &header(nx, ny), data).unwrap();
    }

    /// 20 x 24 velocity mosaic with a measured block at rows 6..13, cols 4..17.
    fn write_velocity(data_dir: &Path, glacier: Glacier) {
        let dir = data_dir.join(glacier.as_str());
        let vx = sentinel_field_with_block(20, 24, 6..13, 4..17);
        let ex = error_field_with_block(20, 24, 6..13, 4..17);
        write_grid(&dir, &format!("{}.vx", PREFIX), &vx);
        write_grid(&dir, &format!("{}.vy", PREFIX), &vx.mapv(|v| if v == SENTINEL { v } else { -v }));
        write_grid(&dir, &format!("{}.ex", PREFIX), &ex);
        write_grid(&dir, &format!("{}.ey", PREFIX), &ex);
    }

    fn config(root: &Path) -> BuilderConfig {
        BuilderConfig {
            data_dir: root.join("data"),
            output_dir: root.join("out"),
            velocity: BTreeMap::from([(Glacier::Helheim, PREFIX.to_string())]),
            bed: vec![Glacier::Helheim],
            remote_surface: vec![Glacier::Helheim],
            local_surface: BTreeMap::new(),
            postprocess: vec![],
            ..BuilderConfig::default()
        }
    }

    fn first_lines(path: &Path) -> (String, String) {
        let text = std::fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        (
            lines.next().unwrap().to_string(),
            lines.next().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_full_run_builds_everything() {
        let root = temp_test_dir();
        write_velocity(&root.path().join("data"), Glacier::Helheim);
        let retriever = FakeRetriever::default();
        let pipeline = Pipeline::new(
            config(root.path()),
            DemSource::Cresis,
            retriever.clone(),
            GeodatReader::new(),
        );

        let report = pipeline.run().await;

        assert!(report.is_success(), "{:?}", report.failed);
        assert_eq!(report.outcome(Glacier::Helheim, Product::Velocity), Some(Outcome::Built));
        assert_eq!(report.outcome(Glacier::Helheim, Product::Bed), Some(Outcome::Built));
        assert_eq!(report.outcome(Glacier::Helheim, Product::Surface), Some(Outcome::Built));

        let out = root.path().join("out").join("helheim");
        for (_, file) in VELOCITY_FIELDS {
            assert_eq!(first_lines(&out.join(file)), ("17".to_string(), "11".to_string()));
        }

        let urls = retriever.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec![
                "http://students.washington.edu/shapero/bed_dems/cresis/helheim/zbDEM.xy".to_string(),
                "http://students.washington.edu/shapero/surface_dems/helheim/zsDEM.xy".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_run_skips_existing_outputs() {
        let root = temp_test_dir();
        write_velocity(&root.path().join("data"), Glacier::Helheim);
        let retriever = FakeRetriever::default();
        let pipeline = Pipeline::new(
            config(root.path()),
            DemSource::Morlighem,
            retriever.clone(),
            GeodatReader::new(),
        );

        pipeline.run().await;
        let report = pipeline.run().await;

        assert!(report.built.is_empty());
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(retriever.urls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_any_velocity_output_skips_stage() {
        let root = temp_test_dir();
        write_velocity(&root.path().join("data"), Glacier::Helheim);
        let out = root.path().join("out").join("helheim");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("EVDEM.xy"), "stale").unwrap();

        let pipeline = Pipeline::new(
            config(root.path()),
            DemSource::Morlighem,
            FakeRetriever::default(),
            GeodatReader::new(),
        );

        assert_eq!(
            pipeline.build_velocity(Glacier::Helheim, PREFIX).unwrap(),
            Outcome::Skipped
        );
        assert!(!out.join("UDEM.xy").exists());
        assert_eq!(std::fs::read_to_string(out.join("EVDEM.xy")).unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_failed_retrieval_is_reported_and_leaves_no_output() {
        let root = temp_test_dir();
        write_velocity(&root.path().join("data"), Glacier::Helheim);
        let pipeline = Pipeline::new(
            config(root.path()),
            DemSource::Morlighem,
            FailingRetriever,
            GeodatReader::new(),
        );

        let report = pipeline.run().await;

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].product, Product::Bed);
        assert!(report.failed[0].error.contains("404"));
        // Velocity is independent of the downloads
        assert_eq!(report.outcome(Glacier::Helheim, Product::Velocity), Some(Outcome::Built));
        assert!(!root.path().join("out/helheim").join(BED_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_dataset_fails_only_that_glacier() {
        let root = temp_test_dir();
        let data_dir = root.path().join("data");
        write_velocity(&data_dir, Glacier::Helheim);

        let empty = Array2::from_elem((8, 8), SENTINEL);
        let kangerd = data_dir.join("kangerd");
        for ext in ["vx", "vy", "ex", "ey"] {
            write_grid(&kangerd, &format!("{}.{}", PREFIX, ext), &empty);
        }

        let mut config = config(root.path());
        config.velocity.insert(Glacier::Kangerd, PREFIX.to_string());
        config.bed.clear();
        config.remote_surface.clear();

        let pipeline = Pipeline::new(config, DemSource::Morlighem, FakeRetriever::default(), GeodatReader::new());
        let report = pipeline.run().await;

        assert_eq!(report.outcome(Glacier::Helheim, Product::Velocity), Some(Outcome::Built));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].glacier, Glacier::Kangerd);
        assert!(report.failed[0].error.contains("no valid"), "{}", report.failed[0].error);
        assert!(!root.path().join("out/kangerd/UDEM.xy").exists());
    }

    #[tokio::test]
    async fn test_mismatched_axes_fail() {
        let root = temp_test_dir();
        let data_dir = root.path().join("data");
        write_velocity(&data_dir, Glacier::Helheim);
        write_grid(
            &data_dir.join("helheim"),
            &format!("{}.ey", PREFIX),
            &Array2::zeros((20, 23)),
        );

        let pipeline = Pipeline::new(
            config(root.path()),
            DemSource::Morlighem,
            FakeRetriever::default(),
            GeodatReader::new(),
        );

        let err = pipeline.build_velocity(Glacier::Helheim, PREFIX).unwrap_err();
        assert!(format!("{:#}", err).contains("does not share the axes"));
    }

    #[tokio::test]
    async fn test_local_surface_is_exported_uncropped() {
        let root = temp_test_dir();
        let data_dir = root.path().join("data");
        let surface = Array2::from_shape_fn((6, 9), |(i, j)| (i * 10 + j) as f32);
        write_grid(&data_dir.join("jakobshavn"), "dem13Mar.smooth", &surface);

        let config = BuilderConfig {
            data_dir,
            output_dir: root.path().join("out"),
            velocity: BTreeMap::new(),
            bed: vec![],
            remote_surface: vec![],
            postprocess: vec![],
            ..BuilderConfig::default()
        };
        let pipeline = Pipeline::new(config, DemSource::Morlighem, FakeRetriever::default(), GeodatReader::new());

        let report = pipeline.run().await;
        assert_eq!(report.outcome(Glacier::Jakobshavn, Product::Surface), Some(Outcome::Built));

        let list: PointList<f32> =
            read_point_list_file(&root.path().join("out/jakobshavn").join(SURFACE_FILE)).unwrap();
        assert_eq!(list.nx(), 9);
        assert_eq!(list.ny(), 6);
        assert_eq!(list.data, surface);
        assert_eq!(list.x[0], -205_000.0);
    }

    #[tokio::test]
    async fn test_postprocess_fills_velocity_holes() {
        let root = temp_test_dir();
        let data_dir = root.path().join("data");
        write_velocity(&data_dir, Glacier::Jakobshavn);

        // Punch a single-cell hole inside the measured block
        let dir = data_dir.join("jakobshavn");
        let mut vx = sentinel_field_with_block(20, 24, 6..13, 4..17);
        vx[[9, 10]] = SENTINEL;
        write_grid(&dir, &format!("{}.vx", PREFIX), &vx);

        let config = BuilderConfig {
            data_dir,
            output_dir: root.path().join("out"),
            velocity: BTreeMap::from([(Glacier::Jakobshavn, PREFIX.to_string())]),
            bed: vec![],
            remote_surface: vec![],
            local_surface: BTreeMap::new(),
            postprocess: vec![Glacier::Jakobshavn],
            ..BuilderConfig::default()
        };
        let pipeline = Pipeline::new(config, DemSource::Morlighem, FakeRetriever::default(), GeodatReader::new());

        let report = pipeline.run().await;
        assert!(report.is_success(), "{:?}", report.failed);
        assert_eq!(report.outcome(Glacier::Jakobshavn, Product::Postprocess), Some(Outcome::Built));

        // Window starts at row 4, col 2
        let list: PointList<f32> =
            read_point_list_file(&root.path().join("out/jakobshavn/UDEM.xy")).unwrap();
        let neighbours = [vx[[8, 10]], vx[[10, 10]], vx[[9, 9]], vx[[9, 11]]];
        let expected = neighbours.iter().map(|v| *v as f64).sum::<f64>() / 4.0;
        assert_approx_eq!(list.data[[5, 8]], expected, 1e-3);

        // Margin cells stay missing
        assert_eq!(list.data[[0, 0]], SENTINEL);

        // The marker makes a re-run skip gap filling
        assert!(root.path().join("out/jakobshavn").join(GAP_FILL_MARKER).exists());
        let report = pipeline.run().await;
        assert_eq!(report.outcome(Glacier::Jakobshavn, Product::Postprocess), Some(Outcome::Skipped));
    }

    #[tokio::test]
    async fn test_postprocess_catches_up_after_interrupted_run() {
        let root = temp_test_dir();
        let data_dir = root.path().join("data");
        write_velocity(&data_dir, Glacier::Jakobshavn);

        let dir = data_dir.join("jakobshavn");
        let mut vx = sentinel_field_with_block(20, 24, 6..13, 4..17);
        vx[[9, 10]] = SENTINEL;
        write_grid(&dir, &format!("{}.vx", PREFIX), &vx);

        let mut config = BuilderConfig {
            data_dir,
            output_dir: root.path().join("out"),
            velocity: BTreeMap::from([(Glacier::Jakobshavn, PREFIX.to_string())]),
            bed: vec![],
            remote_surface: vec![],
            local_surface: BTreeMap::new(),
            postprocess: vec![],
            ..BuilderConfig::default()
        };

        // First run stops after the velocity export
        let pipeline = Pipeline::new(
            config.clone(),
            DemSource::Morlighem,
            FakeRetriever::default(),
            GeodatReader::new(),
        );
        pipeline.run().await;

        config.postprocess = vec![Glacier::Jakobshavn];
        let pipeline = Pipeline::new(config, DemSource::Morlighem, FakeRetriever::default(), GeodatReader::new());
        let report = pipeline.run().await;

        assert!(report.is_success(), "{:?}", report.failed);
        assert_eq!(report.outcome(Glacier::Jakobshavn, Product::Velocity), Some(Outcome::Skipped));
        assert_eq!(report.outcome(Glacier::Jakobshavn, Product::Postprocess), Some(Outcome::Built));

        let list: PointList<f32> =
            read_point_list_file(&root.path().join("out/jakobshavn/UDEM.xy")).unwrap();
        assert_ne!(list.data[[5, 8]], SENTINEL);
    }

    #[tokio::test]
    async fn test_postprocess_without_velocity_output_fails() {
        let root = temp_test_dir();
        let config = BuilderConfig {
            data_dir: root.path().join("data"),
            output_dir: root.path().join("out"),
            velocity: BTreeMap::new(),
            bed: vec![],
            remote_surface: vec![],
            local_surface: BTreeMap::new(),
            postprocess: vec![Glacier::Jakobshavn],
            ..BuilderConfig::default()
        };
        let pipeline = Pipeline::new(config, DemSource::Morlighem, FakeRetriever::default(), GeodatReader::new());

        let report = pipeline.run().await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].product, Product::Postprocess);
        assert!(!root.path().join("out/jakobshavn").join(GAP_FILL_MARKER).exists());
    }
}
