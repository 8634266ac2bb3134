use scene::EmptyDatasetError;

use crate::renderer::{AssetLoadError, RendererError};

/// Failures surfaced by [`crate::MapController`] to whoever drives it.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Startup is waiting for a collection with at least one point.
    EmptyDataset(EmptyDatasetError),
    /// Neither marker asset could be loaded.
    AssetLoad {
        primary: AssetLoadError,
        fallback: AssetLoadError,
    },
    Renderer(RendererError),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::EmptyDataset(e) => write!(f, "{e}"),
            MapError::AssetLoad { primary, fallback } => {
                write!(f, "marker icon unavailable ({primary}; fallback: {fallback})")
            }
            MapError::Renderer(e) => write!(f, "renderer error: {e}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::EmptyDataset(e) => Some(e),
            MapError::AssetLoad { fallback, .. } => Some(fallback),
            MapError::Renderer(e) => Some(e),
        }
    }
}

impl From<RendererError> for MapError {
    fn from(e: RendererError) -> Self {
        MapError::Renderer(e)
    }
}

impl From<EmptyDatasetError> for MapError {
    fn from(e: EmptyDatasetError) -> Self {
        MapError::EmptyDataset(e)
    }
}
