use std::fs;
use std::path::{Path, PathBuf};

use foundation::LonLat;
use layers::ZoomRamp;
use serde::Deserialize;

pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/streets-v11";
pub const DEFAULT_MARKER_URL: &str = "https://docs.mapbox.com/mapbox-gl-js/assets/custom_marker.png";
pub const FALLBACK_MARKER_URL: &str = "assets/marker-icon.png";

/// Marker asset and the icon size to draw it with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerIcon {
    pub url: String,
    pub size: ZoomRamp,
}

/// Settings for the map and its accident layers.
///
/// Every field has a default, so a config file only lists overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub style: String,
    pub initial_zoom: f64,
    /// `[lon, lat]` shown before the data has been framed.
    pub initial_center: [f64; 2],
    /// Screen padding around the data when fitting bounds.
    pub bounds_padding: f64,
    pub source_name: String,
    /// Feature property whose distinct values become layers.
    pub category_property: String,
    pub marker_image_name: String,
    pub primary_marker: MarkerIcon,
    pub fallback_marker: MarkerIcon,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            initial_zoom: 0.0,
            initial_center: [50.0, 50.0],
            bounds_padding: 50.0,
            source_name: "roadAccidents".to_string(),
            category_property: "type".to_string(),
            marker_image_name: "custom-marker".to_string(),
            primary_marker: MarkerIcon {
                url: DEFAULT_MARKER_URL.to_string(),
                size: ZoomRamp::linear(&[(5.0, 0.5), (15.0, 2.0)]),
            },
            fallback_marker: MarkerIcon {
                url: FALLBACK_MARKER_URL.to_string(),
                size: ZoomRamp::linear(&[(5.0, 0.01), (15.0, 0.07)]),
            },
        }
    }
}

/// What the renderer needs to create the map itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub style: String,
    pub zoom: f64,
    pub center: LonLat,
}

impl MapConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            style: self.style.clone(),
            zoom: self.initial_zoom,
            center: LonLat::from(self.initial_center),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
