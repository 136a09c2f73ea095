//! Builder configuration.
//!
//! Which glaciers get which products, where the raw grids live and where the
//! remote DEMs are hosted. Loaded from YAML (see `config/dem-builder.yaml`);
//! every field has a default matching the standard data sets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ice_common::{DemSource, Glacier};
use serde::Deserialize;
use tracing::debug;

/// Root configuration for a build run.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderConfig {
    /// Directory holding `<glacier>/` raw grid directories
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory receiving `<glacier>/` output directories
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Base URL of the hosted bed and surface DEMs
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Cells of padding kept around the measured velocity region
    #[serde(default = "default_margin")]
    pub margin: usize,
    /// "No data" value of the velocity mosaics
    #[serde(default = "default_sentinel")]
    pub sentinel: f32,
    /// Raw velocity file prefix per glacier
    #[serde(default = "default_velocity")]
    pub velocity: BTreeMap<Glacier, String>,
    /// Glaciers whose bed DEM is downloaded
    #[serde(default = "default_bed")]
    pub bed: Vec<Glacier>,
    /// Glaciers whose surface DEM is downloaded
    #[serde(default = "default_remote_surface")]
    pub remote_surface: Vec<Glacier>,
    /// Raw surface grid file per glacier, exported without cropping
    #[serde(default = "default_local_surface")]
    pub local_surface: BTreeMap<Glacier, String>,
    /// Glaciers whose velocity files are gap-filled after export
    #[serde(default = "default_postprocess")]
    pub postprocess: Vec<Glacier>,
    #[serde(default)]
    pub gap_fill: GapFillConfig,
}

/// Gap filling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GapFillConfig {
    /// Valid 4-neighbours required before a missing cell is filled
    #[serde(default = "default_min_neighbours")]
    pub min_neighbours: usize,
    /// Upper bound on filling passes
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl Default for GapFillConfig {
    fn default() -> Self {
        Self {
            min_neighbours: default_min_neighbours(),
            max_passes: default_max_passes(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("../data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_base_url() -> String {
    "http://students.washington.edu/shapero/".to_string()
}

fn default_margin() -> usize {
    grid_window::DEFAULT_MARGIN
}

fn default_sentinel() -> f32 {
    -2.0e9
}

fn default_velocity() -> BTreeMap<Glacier, String> {
    BTreeMap::from([
        (Glacier::Helheim, "TSX_E66.50N_27Jan09_07Feb09".to_string()),
        (Glacier::Kangerd, "TSX_E68.80N_28Jan09_08Feb09".to_string()),
        (Glacier::Jakobshavn, "mosaicOffsets".to_string()),
    ])
}

fn default_bed() -> Vec<Glacier> {
    Glacier::ALL.to_vec()
}

fn default_remote_surface() -> Vec<Glacier> {
    vec![Glacier::Helheim, Glacier::Kangerd]
}

fn default_local_surface() -> BTreeMap<Glacier, String> {
    BTreeMap::from([(Glacier::Jakobshavn, "dem13Mar.smooth".to_string())])
}

fn default_postprocess() -> Vec<Glacier> {
    vec![Glacier::Jakobshavn]
}

fn default_min_neighbours() -> usize {
    3
}

fn default_max_passes() -> usize {
    3
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            base_url: default_base_url(),
            margin: default_margin(),
            sentinel: default_sentinel(),
            velocity: default_velocity(),
            bed: default_bed(),
            remote_surface: default_remote_surface(),
            local_surface: default_local_surface(),
            postprocess: default_postprocess(),
            gap_fill: GapFillConfig::default(),
        }
    }
}

impl BuilderConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: BuilderConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded builder config");
        Ok(config)
    }

    /// Apply overrides from environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("DEM_BASE_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("DEM_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("DEM_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must be an http(s) URL, got '{}'", self.base_url);
        }

        if self.velocity.values().any(|prefix| prefix.is_empty()) {
            bail!("velocity file prefixes must not be empty");
        }

        if let Some(glacier) = self
            .remote_surface
            .iter()
            .find(|g| self.local_surface.contains_key(g))
        {
            bail!("surface DEM for {} is configured as both remote and local", glacier);
        }

        if self.gap_fill.min_neighbours == 0 || self.gap_fill.min_neighbours > 4 {
            bail!("gap_fill.min_neighbours must be 1-4");
        }

        Ok(())
    }

    /// Every glacier that gets an output directory.
    pub fn glaciers(&self) -> BTreeSet<Glacier> {
        self.velocity
            .keys()
            .chain(self.local_surface.keys())
            .chain(&self.bed)
            .chain(&self.remote_surface)
            .chain(&self.postprocess)
            .copied()
            .collect()
    }

    /// Output directory for one glacier.
    pub fn glacier_dir(&self, glacier: Glacier) -> PathBuf {
        self.output_dir.join(glacier.as_str())
    }

    /// Raw grid path `<data_dir>/<glacier>/<name>`.
    pub fn source_path(&self, glacier: Glacier, name: &str) -> PathBuf {
        self.data_dir.join(glacier.as_str()).join(name)
    }

    /// URL of the bed DEM for a glacier.
    pub fn bed_url(&self, source: DemSource, glacier: Glacier) -> String {
        format!(
            "{}/bed_dems/{}/{}/zbDEM.xy",
            self.base_url.trim_end_matches('/'),
            source,
            glacier
        )
    }

    /// URL of the surface DEM for a glacier.
    pub fn surface_url(&self, glacier: Glacier) -> String {
        format!(
            "{}/surface_dems/{}/zsDEM.xy",
            self.base_url.trim_end_matches('/'),
            glacier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_datasets() {
        let config = BuilderConfig::default();
        assert_eq!(config.margin, 2);
        assert_eq!(config.sentinel, -2.0e9);
        assert_eq!(config.velocity[&Glacier::Jakobshavn], "mosaicOffsets");
        assert_eq!(config.bed.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_urls() {
        let config = BuilderConfig::default();
        assert_eq!(
            config.bed_url(DemSource::Morlighem, Glacier::Helheim),
            "http://students.washington.edu/shapero/bed_dems/morlighem/helheim/zbDEM.xy"
        );
        assert_eq!(
            config.surface_url(Glacier::Kangerd),
            "http://students.washington.edu/shapero/surface_dems/kangerd/zsDEM.xy"
        );
    }

    #[test]
    fn test_url_without_trailing_slash() {
        let config = BuilderConfig {
            base_url: "https://example.org/dems".to_string(),
            ..BuilderConfig::default()
        };
        assert_eq!(
            config.bed_url(DemSource::Cresis, Glacier::Jakobshavn),
            "https://example.org/dems/bed_dems/cresis/jakobshavn/zbDEM.xy"
        );
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
data_dir: /srv/data
velocity:
  helheim: TSX_test
bed: [helheim]
remote_surface: []
local_surface: {}
postprocess: []
"#;

        let config: BuilderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.velocity.len(), 1);
        assert_eq!(config.margin, 2);
        assert_eq!(config.gap_fill, GapFillConfig::default());
        assert_eq!(
            config.glaciers().into_iter().collect::<Vec<_>>(),
            vec![Glacier::Helheim]
        );
        assert_eq!(
            config.source_path(Glacier::Helheim, "TSX_test.vx"),
            PathBuf::from("/srv/data/helheim/TSX_test.vx")
        );
    }

    #[test]
    fn test_unknown_glacier_in_yaml() {
        let yaml = "velocity:\n  disko: something\n";
        assert!(serde_yaml::from_str::<BuilderConfig>(yaml).is_err());
    }

    #[test]
    fn test_validate_rejects_conflicting_surface() {
        let config = BuilderConfig {
            remote_surface: vec![Glacier::Jakobshavn],
            ..BuilderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = test_utils::workspace_root().join("services/dem-builder/config/dem-builder.yaml");
        let config = BuilderConfig::load(&path).unwrap();
        let defaults = BuilderConfig::default();

        assert_eq!(config.velocity, defaults.velocity);
        assert_eq!(config.bed, defaults.bed);
        assert_eq!(config.remote_surface, defaults.remote_surface);
        assert_eq!(config.local_surface, defaults.local_surface);
        assert_eq!(config.postprocess, defaults.postprocess);
        assert_eq!(config.gap_fill, defaults.gap_fill);
        assert_eq!(config.base_url, defaults.base_url);
        assert!(config.validate().is_ok());
    }
}
