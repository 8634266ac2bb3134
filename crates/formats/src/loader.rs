use std::fs;
use std::path::{Path, PathBuf};

use scene::FeatureCollection;

use crate::geojson::{FeatureCollectionError, parse_feature_collection};

#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: FeatureCollectionError,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

/// Read a GeoJSON FeatureCollection from disk.
pub fn load_feature_collection(path: impl AsRef<Path>) -> Result<FeatureCollection, LoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature_collection(&payload).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
