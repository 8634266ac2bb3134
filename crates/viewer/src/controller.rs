use std::collections::BTreeMap;

use foundation::LonLat;
use layers::{
    LayerId, LayerRegistry, SymbolLayerSpec, Visibility, VisibilityBus, VisibilityChangeEvent,
    ZoomRamp, derive_layers,
};
use runtime::{Inbox, Join, JoinStatus, Metrics};
use scene::{Feature, FeatureCollection, GeoDataStore, PopupPayload, resolve_popup};
use tracing::{debug, error, info, warn};

use crate::config::{MapConfig, MapOptions};
use crate::error::MapError;
use crate::renderer::{Cursor, MapEventKind, MapRenderer};

const SIGNAL_DATA: &str = "data";
const SIGNAL_MAP: &str = "map";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the data and the map's load signal.
    Uninitialized,
    /// Framing the data, loading the marker and adding the source.
    Loading,
    /// Layers exist and interaction is wired.
    Ready,
    /// Startup failed; nothing further is created.
    Failed,
}

impl ControllerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Uninitialized => "uninitialized",
            ControllerState::Loading => "loading",
            ControllerState::Ready => "ready",
            ControllerState::Failed => "failed",
        }
    }
}

/// Event reported by the map engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Load,
    Click {
        layer_id: String,
        feature: Feature,
        /// Pointer position; longitude may lie outside [-180, 180].
        lng_lat: LonLat,
    },
    MouseEnter {
        layer_id: String,
    },
    MouseLeave {
        layer_id: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerAction {
    OpenPopup,
    SetCursor(Cursor),
}

/// What each pointer event does on one layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayerHandlers {
    pub click: PointerAction,
    pub enter: PointerAction,
    pub leave: PointerAction,
}

impl Default for LayerHandlers {
    fn default() -> Self {
        Self {
            click: PointerAction::OpenPopup,
            enter: PointerAction::SetCursor(Cursor::Pointer),
            leave: PointerAction::SetCursor(Cursor::Default),
        }
    }
}

type ReadyCallback = Box<dyn FnOnce(&[LayerId])>;

/// Drives a [`MapRenderer`] from the accident data and user interaction.
///
/// Startup is a join: layers are created once both the data (`set_data`) and
/// the map's load event have arrived, in either order. After that the layer
/// set is fixed and only visibility and popups change.
///
/// All methods run on the host's event loop; events are handled strictly one
/// at a time.
pub struct MapController<R: MapRenderer> {
    renderer: R,
    config: MapConfig,
    state: ControllerState,
    startup: Join,
    store: GeoDataStore,
    registry: LayerRegistry,
    handlers: BTreeMap<LayerId, LayerHandlers>,
    icon_size: Option<ZoomRamp>,
    visibility_inbox: Option<Inbox<VisibilityChangeEvent>>,
    active_popup: Option<PopupPayload>,
    cursor: Cursor,
    ready_callbacks: Vec<ReadyCallback>,
    metrics: Metrics,
}

impl<R: MapRenderer> MapController<R> {
    /// Create the map through `factory` and subscribe to its load event.
    pub fn initialize<F>(config: MapConfig, factory: F) -> Self
    where
        F: FnOnce(&MapOptions) -> R,
    {
        let mut renderer = factory(&config.map_options());
        renderer.on(MapEventKind::Load, None);
        Self {
            renderer,
            config,
            state: ControllerState::Uninitialized,
            startup: Join::new(&[SIGNAL_DATA, SIGNAL_MAP]),
            store: GeoDataStore::new(),
            registry: LayerRegistry::new(),
            handlers: BTreeMap::new(),
            icon_size: None,
            visibility_inbox: None,
            active_popup: None,
            cursor: Cursor::Default,
            ready_callbacks: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    /// Run `callback` with the layer ids once the controller is ready.
    ///
    /// Runs immediately if it already is.
    pub fn on_ready(&mut self, callback: impl FnOnce(&[LayerId]) + 'static) {
        if self.state == ControllerState::Ready {
            callback(&self.registry.ids());
        } else {
            self.ready_callbacks.push(Box::new(callback));
        }
    }

    /// Receive visibility changes published on `bus` from now on.
    ///
    /// Changes are queued, not applied on publish: the host must call
    /// [`MapController::pump_visibility`] after handling each UI event, or
    /// the renderer keeps showing the old visibility.
    pub fn attach_visibility_bus(&mut self, bus: &mut VisibilityBus) {
        self.visibility_inbox = Some(bus.inbox());
    }

    /// Replace the dataset.
    ///
    /// Before startup this may complete the join. Afterwards only the store
    /// changes: renderer layers are never recreated and the renderer source
    /// keeps the collection it was created with, so the two disagree until
    /// the host reloads the map.
    pub fn set_data(&mut self, collection: FeatureCollection) -> Result<(), MapError> {
        if self.state == ControllerState::Ready {
            warn!(
                source = %self.config.source_name,
                "dataset replaced after startup; renderer source keeps the previous data"
            );
            self.metrics.inc_counter("source.stale", 1);
        }
        self.store.set_data(collection);
        debug!(
            features = self.store.data().len(),
            revision = self.store.revision(),
            "dataset replaced"
        );
        self.startup.signal(SIGNAL_DATA);
        self.try_start()
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Result<(), MapError> {
        match event {
            MapEvent::Load => {
                if self.startup.signal(SIGNAL_MAP) == JoinStatus::AlreadyComplete {
                    debug!("repeated map load signal");
                }
                self.try_start()
            }
            MapEvent::Click {
                layer_id,
                feature,
                lng_lat,
            } => {
                if let Some(h) = self.handlers_for(&layer_id) {
                    self.perform(h.click, Some((&feature, lng_lat)));
                }
                Ok(())
            }
            MapEvent::MouseEnter { layer_id } => {
                if let Some(h) = self.handlers_for(&layer_id) {
                    self.perform(h.enter, None);
                }
                Ok(())
            }
            MapEvent::MouseLeave { layer_id } => {
                if let Some(h) = self.handlers_for(&layer_id) {
                    self.perform(h.leave, None);
                }
                Ok(())
            }
        }
    }

    /// Apply every visibility change queued since the last call, in order.
    ///
    /// Returns how many changes reached a layer.
    pub fn pump_visibility(&mut self) -> usize {
        let Some(inbox) = &self.visibility_inbox else {
            return 0;
        };
        let events = inbox.drain();
        events
            .iter()
            .filter(|event| self.apply_visibility(event))
            .count()
    }

    /// Set a layer's `visibility` layout property.
    ///
    /// Unknown layer ids are ignored and return `false`.
    pub fn apply_visibility(&mut self, event: &VisibilityChangeEvent) -> bool {
        let id = event.layer_id.as_str();
        if !self.registry.contains(id) || !self.renderer.has_layer(id) {
            debug!(layer = id, "ignoring visibility change for unknown layer");
            self.metrics.inc_counter("visibility.ignored", 1);
            return false;
        }

        let visibility = event.visibility();
        if let Err(e) = self
            .renderer
            .set_layout_property(id, "visibility", visibility.as_str())
        {
            warn!(layer = id, "visibility change rejected: {e}");
            self.metrics.inc_counter("visibility.ignored", 1);
            return false;
        }
        self.registry.set_visibility(id, visibility);
        self.metrics.inc_counter("visibility.applied", 1);
        true
    }

    pub fn close_popup(&mut self) {
        if self.active_popup.take().is_some() {
            self.renderer.close_popup();
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn store(&self) -> &GeoDataStore {
        &self.store
    }

    /// Layer ids in creation order, for the filter controls.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.registry.ids()
    }

    pub fn layer_visibility(&self, id: &str) -> Option<Visibility> {
        self.registry.visibility(id)
    }

    pub fn handlers(&self, id: &str) -> Option<&LayerHandlers> {
        self.handlers.get(&LayerId::from(id))
    }

    pub fn active_popup(&self) -> Option<&PopupPayload> {
        self.active_popup.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn handlers_for(&self, layer_id: &str) -> Option<LayerHandlers> {
        if self.state != ControllerState::Ready {
            debug!(layer = layer_id, "pointer event before ready");
            return None;
        }
        self.handlers(layer_id).copied()
    }

    fn perform(&mut self, action: PointerAction, click: Option<(&Feature, LonLat)>) {
        match (action, click) {
            (PointerAction::OpenPopup, Some((feature, pointer))) => self.open_popup(feature, pointer),
            (PointerAction::OpenPopup, None) => {}
            (PointerAction::SetCursor(cursor), _) => {
                self.cursor = cursor;
                self.renderer.set_cursor(cursor);
            }
        }
    }

    fn open_popup(&mut self, feature: &Feature, pointer: LonLat) {
        let Some(payload) = resolve_popup(feature, pointer.lon) else {
            debug!(
                kind = feature.geometry.kind().as_str(),
                "no popup for non-point feature"
            );
            self.metrics.inc_counter("popup.skipped", 1);
            return;
        };
        if self.active_popup.is_some() {
            self.renderer.close_popup();
        }
        self.renderer.open_popup(&payload);
        self.active_popup = Some(payload);
        self.metrics.inc_counter("popup.opened", 1);
    }

    fn try_start(&mut self) -> Result<(), MapError> {
        if self.state != ControllerState::Uninitialized || !self.startup.is_complete() {
            return Ok(());
        }
        let bounds = match self.store.bounds() {
            Ok(b) => b,
            Err(e) => {
                warn!("map is ready but the dataset is empty; waiting for data");
                return Err(e.into());
            }
        };

        self.state = ControllerState::Loading;
        info!(features = self.store.data().len(), "map loading");
        self.renderer.fit_bounds(bounds, self.config.bounds_padding);

        if let Err(e) = self.load_layers() {
            error!("map initialization failed: {e}");
            self.state = ControllerState::Failed;
            return Err(e);
        }

        self.state = ControllerState::Ready;
        let ids = self.registry.ids();
        self.metrics.set_gauge("layers", ids.len() as i64);
        info!(layers = ids.len(), "map ready");
        for callback in self.ready_callbacks.drain(..) {
            callback(&ids);
        }
        Ok(())
    }

    fn load_layers(&mut self) -> Result<(), MapError> {
        let icon_size = self.load_marker()?;

        let source = self.config.source_name.clone();
        if !self.renderer.has_source(&source) {
            self.renderer.add_source(&source, self.store.data())?;
        }

        for id in derive_layers(self.store.data(), &self.config.category_property) {
            if !self.renderer.has_layer(id.as_str()) {
                let spec = SymbolLayerSpec::for_category(
                    id.clone(),
                    source.as_str(),
                    self.config.marker_image_name.as_str(),
                    icon_size.clone(),
                    self.config.category_property.as_str(),
                );
                self.renderer.add_layer(&spec)?;
                self.metrics.inc_counter("layers.created", 1);
            }
            if self.registry.register(id.clone()) {
                for kind in [
                    MapEventKind::Click,
                    MapEventKind::MouseEnter,
                    MapEventKind::MouseLeave,
                ] {
                    self.renderer.on(kind, Some(id.as_str()));
                }
                self.handlers.insert(id, LayerHandlers::default());
            }
        }
        Ok(())
    }

    /// Load and register the marker icon, returning the size ramp to draw it with.
    fn load_marker(&mut self) -> Result<ZoomRamp, MapError> {
        let name = self.config.marker_image_name.clone();
        if let Some(size) = &self.icon_size
            && self.renderer.has_image(&name)
        {
            return Ok(size.clone());
        }

        let primary = self.config.primary_marker.clone();
        let (image, size) = match self.renderer.load_image(&primary.url) {
            Ok(image) => (image, primary.size),
            Err(primary_err) => {
                warn!("{primary_err}; trying fallback marker");
                self.metrics.inc_counter("marker.fallback", 1);
                let fallback = self.config.fallback_marker.clone();
                match self.renderer.load_image(&fallback.url) {
                    Ok(image) => (image, fallback.size),
                    Err(fallback_err) => {
                        return Err(MapError::AssetLoad {
                            primary: primary_err,
                            fallback: fallback_err,
                        });
                    }
                }
            }
        };

        if !self.renderer.has_image(&name) {
            self.renderer.add_image(&name, image)?;
        }
        self.icon_size = Some(size.clone());
        Ok(size)
    }
}
