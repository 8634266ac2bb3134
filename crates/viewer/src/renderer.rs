use foundation::GeoBounds;
use layers::SymbolLayerSpec;
use scene::{FeatureCollection, PopupPayload};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Load,
    Click,
    MouseEnter,
    MouseLeave,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Decoded marker image handed back by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadError {
    pub url: String,
    pub reason: String,
}

impl std::fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for AssetLoadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    DuplicateSource(String),
    DuplicateLayer(String),
    DuplicateImage(String),
    UnknownLayer(String),
    UnknownSource(String),
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererError::DuplicateSource(id) => write!(f, "source {id} already exists"),
            RendererError::DuplicateLayer(id) => write!(f, "layer {id} already exists"),
            RendererError::DuplicateImage(id) => write!(f, "image {id} already exists"),
            RendererError::UnknownLayer(id) => write!(f, "layer {id} does not exist"),
            RendererError::UnknownSource(id) => write!(f, "source {id} does not exist"),
        }
    }
}

impl std::error::Error for RendererError {}

/// The map engine, as seen by [`crate::MapController`].
///
/// Implementations wrap an engine instance; the controller owns the only
/// handle and funnels every mutation through these methods. Adding something
/// that already exists is an error, so callers check first.
///
/// Asynchronous engine operations (image loading, readiness) are resolved by
/// the host event loop: `load_image` returns once the load has finished, and
/// readiness is reported back as [`crate::MapEvent::Load`].
pub trait MapRenderer {
    fn load_image(&mut self, url: &str) -> Result<MarkerImage, AssetLoadError>;
    fn add_image(&mut self, name: &str, image: MarkerImage) -> Result<(), RendererError>;
    fn has_image(&self, name: &str) -> bool;

    fn add_source(&mut self, name: &str, data: &FeatureCollection) -> Result<(), RendererError>;
    fn has_source(&self, name: &str) -> bool;

    fn add_layer(&mut self, spec: &SymbolLayerSpec) -> Result<(), RendererError>;
    fn has_layer(&self, id: &str) -> bool;
    fn set_layout_property(
        &mut self,
        layer_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RendererError>;

    /// Ask the engine to report `kind` events, optionally scoped to one layer.
    fn on(&mut self, kind: MapEventKind, layer_id: Option<&str>);

    fn fit_bounds(&mut self, bounds: GeoBounds, padding: f64);
    fn open_popup(&mut self, payload: &PopupPayload);
    fn close_popup(&mut self);
    fn set_cursor(&mut self, cursor: Cursor);
}
