//! Dashboard configuration file.
//!
//! ```toml
//! [data]
//! incidents = "data/street.csv.gz"
//! districts = "data/districts.csv"
//!
//! [boundaries.district]
//! path = "data/lad.geojson"
//! code_property = "LAD19CD"
//!
//! [boundaries.small_area]
//! path = "data/lsoa.geojson"
//! code_property = "LSOA11CD"
//!
//! [map]
//! default_latitude = 54.0
//! default_longitude = -2.0
//! default_zoom = 5.0
//! postcode_zoom = 12.0
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use uk_crime_dashboard_models::MapAnchor;

use crate::DashboardError;

/// Config file read when neither `--config` nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "UK_CRIME_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Input tables.
    pub data: DataConfig,
    /// Boundary files for the choropleths.
    #[serde(default)]
    pub boundaries: BoundariesConfig,
    /// Map defaults.
    #[serde(default)]
    pub map: MapConfig,
}

/// Input table paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Incident CSV, optionally gzip-compressed.
    pub incidents: PathBuf,
    /// District population reference CSV.
    pub districts: PathBuf,
}

/// Optional boundary files per granularity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundariesConfig {
    /// Small-area (LSOA) boundaries.
    pub small_area: Option<BoundaryFileConfig>,
    /// District boundaries.
    pub district: Option<BoundaryFileConfig>,
}

/// One boundary `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryFileConfig {
    /// `GeoJSON` file.
    pub path: PathBuf,
    /// Feature property holding the region code.
    pub code_property: String,
}

/// Map centering defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Latitude of the national default anchor.
    pub default_latitude: f64,
    /// Longitude of the national default anchor.
    pub default_longitude: f64,
    /// Zoom of the national default anchor.
    pub default_zoom: f64,
    /// Zoom used when centered on a postcode.
    pub postcode_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: 54.0,
            default_longitude: -2.0,
            default_zoom: 5.0,
            postcode_zoom: 12.0,
        }
    }
}

impl MapConfig {
    /// The national default anchor.
    #[must_use]
    pub const fn default_anchor(&self) -> MapAnchor {
        MapAnchor {
            latitude: self.default_latitude,
            longitude: self.default_longitude,
            zoom: self.default_zoom,
            postcode: None,
            district_code: None,
            is_default: true,
        }
    }
}

impl DashboardConfig {
    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_toml_str(&text, base_dir)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses configuration text, resolving relative paths against
    /// `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::ConfigParse`] if the text is not valid.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self, DashboardError> {
        let mut config: Self = toml::de::from_str(text)?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };

        resolve(&mut self.data.incidents);
        resolve(&mut self.data.districts);
        for boundary in [&mut self.boundaries.small_area, &mut self.boundaries.district]
            .into_iter()
            .flatten()
        {
            resolve(&mut boundary.path);
        }
    }
}
