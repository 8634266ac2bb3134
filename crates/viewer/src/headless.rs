use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

use formats::feature_collection_to_value;
use foundation::{GeoBounds, LonLat};
use layers::SymbolLayerSpec;
use scene::{FeatureCollection, PopupPayload};
use serde_json::Value;
use tracing::debug;

use crate::config::MapOptions;
use crate::renderer::{
    AssetLoadError, Cursor, MapEventKind, MapRenderer, MarkerImage, RendererError,
};

/// One call made against [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    LoadImage { url: String, ok: bool },
    AddImage { name: String },
    AddSource { name: String, features: usize },
    AddLayer { id: String, style: Value },
    SetLayoutProperty { layer_id: String, name: String, value: String },
    On { kind: MapEventKind, layer_id: Option<String> },
    FitBounds { bounds: GeoBounds, padding: f64 },
    OpenPopup { anchor: LonLat, content: Value },
    ClosePopup,
    SetCursor(Cursor),
}

/// Shared, append-only record of renderer commands.
///
/// Cloning yields another handle to the same record, so a test can keep one
/// while the controller owns the renderer.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<RenderCommand>>>);

impl CommandLog {
    fn push(&self, cmd: RenderCommand) {
        self.0.borrow_mut().push(cmd);
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&RenderCommand) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Style JSON the layer was added with.
    pub fn layer_style(&self, id: &str) -> Option<Value> {
        self.0.borrow().iter().find_map(|c| match c {
            RenderCommand::AddLayer { id: lid, style } if lid == id => Some(style.clone()),
            _ => None,
        })
    }

    /// Effective `visibility` of a layer: the last value set, else the default.
    pub fn visibility(&self, id: &str) -> Option<String> {
        let cmds = self.0.borrow();
        let added = cmds
            .iter()
            .any(|c| matches!(c, RenderCommand::AddLayer { id: lid, .. } if lid == id));
        if !added {
            return None;
        }
        let last = cmds.iter().rev().find_map(|c| match c {
            RenderCommand::SetLayoutProperty {
                layer_id,
                name,
                value,
            } if layer_id == id && name == "visibility" => Some(value.clone()),
            _ => None,
        });
        Some(last.unwrap_or_else(|| "visible".to_string()))
    }
}

/// Map engine stand-in that keeps state in memory and records every call.
///
/// Mirrors an engine's bookkeeping closely enough to exercise the
/// controller: ids must be unique, layers must exist before their layout
/// changes, and images listed as unreachable fail to load.
#[derive(Debug)]
pub struct RecordingRenderer {
    log: CommandLog,
    unreachable: HashSet<String>,
    images: BTreeSet<String>,
    sources: BTreeMap<String, Value>,
    layers: BTreeMap<String, BTreeMap<String, String>>,
    popup: Option<Value>,
    cursor: Cursor,
}

impl RecordingRenderer {
    pub fn new(options: &MapOptions) -> Self {
        debug!(style = %options.style, zoom = options.zoom, "headless map created");
        Self {
            log: CommandLog::default(),
            unreachable: HashSet::new(),
            images: BTreeSet::new(),
            sources: BTreeMap::new(),
            layers: BTreeMap::new(),
            popup: None,
            cursor: Cursor::Default,
        }
    }

    pub fn with_log(mut self, log: CommandLog) -> Self {
        self.log = log;
        self
    }

    /// Image URLs that fail to load.
    pub fn with_unreachable(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.unreachable.extend(urls);
        self
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    pub fn source_data(&self, name: &str) -> Option<&Value> {
        self.sources.get(name)
    }

    pub fn layout_property(&self, layer_id: &str, name: &str) -> Option<&str> {
        self.layers.get(layer_id)?.get(name).map(String::as_str)
    }

    pub fn popup(&self) -> Option<&Value> {
        self.popup.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl MapRenderer for RecordingRenderer {
    fn load_image(&mut self, url: &str) -> Result<MarkerImage, AssetLoadError> {
        let ok = !self.unreachable.contains(url);
        self.log.push(RenderCommand::LoadImage {
            url: url.to_string(),
            ok,
        });
        if !ok {
            return Err(AssetLoadError {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            });
        }
        Ok(MarkerImage {
            url: url.to_string(),
            width: 32,
            height: 32,
        })
    }

    fn add_image(&mut self, name: &str, _image: MarkerImage) -> Result<(), RendererError> {
        if !self.images.insert(name.to_string()) {
            return Err(RendererError::DuplicateImage(name.to_string()));
        }
        self.log.push(RenderCommand::AddImage {
            name: name.to_string(),
        });
        Ok(())
    }

    fn has_image(&self, name: &str) -> bool {
        self.images.contains(name)
    }

    fn add_source(&mut self, name: &str, data: &FeatureCollection) -> Result<(), RendererError> {
        if self.sources.contains_key(name) {
            return Err(RendererError::DuplicateSource(name.to_string()));
        }
        self.sources
            .insert(name.to_string(), feature_collection_to_value(data));
        self.log.push(RenderCommand::AddSource {
            name: name.to_string(),
            features: data.len(),
        });
        Ok(())
    }

    fn has_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    fn add_layer(&mut self, spec: &SymbolLayerSpec) -> Result<(), RendererError> {
        let id = spec.id.as_str();
        if self.layers.contains_key(id) {
            return Err(RendererError::DuplicateLayer(id.to_string()));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(RendererError::UnknownSource(spec.source.clone()));
        }
        let mut layout = BTreeMap::new();
        layout.insert("visibility".to_string(), "visible".to_string());
        self.layers.insert(id.to_string(), layout);
        self.log.push(RenderCommand::AddLayer {
            id: id.to_string(),
            style: spec.to_style_json(),
        });
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn set_layout_property(
        &mut self,
        layer_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RendererError> {
        let layout = self
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| RendererError::UnknownLayer(layer_id.to_string()))?;
        layout.insert(name.to_string(), value.to_string());
        self.log.push(RenderCommand::SetLayoutProperty {
            layer_id: layer_id.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn on(&mut self, kind: MapEventKind, layer_id: Option<&str>) {
        self.log.push(RenderCommand::On {
            kind,
            layer_id: layer_id.map(str::to_string),
        });
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, padding: f64) {
        self.log.push(RenderCommand::FitBounds { bounds, padding });
    }

    fn open_popup(&mut self, payload: &PopupPayload) {
        let content = payload.to_json_value();
        self.popup = Some(content.clone());
        self.log.push(RenderCommand::OpenPopup {
            anchor: payload.anchor,
            content,
        });
    }

    fn close_popup(&mut self) {
        self.popup = None;
        self.log.push(RenderCommand::ClosePopup);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.log.push(RenderCommand::SetCursor(cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandLog, RecordingRenderer, RenderCommand};
    use crate::config::MapConfig;
    use crate::renderer::{MapRenderer, RendererError};
    use foundation::LonLat;
    use layers::{LayerId, SymbolLayerSpec, ZoomRamp};
    use scene::{Feature, FeatureCollection, PopupPayload};
    use serde_json::{Map, json};

    fn spec(id: &str, source: &str) -> SymbolLayerSpec {
        SymbolLayerSpec::for_category(
            LayerId::from(id),
            source,
            "custom-marker",
            ZoomRamp::linear(&[(0.0, 1.0)]),
            "type",
        )
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options());
        let fc = FeatureCollection::default();
        r.add_source("s", &fc).unwrap();
        assert_eq!(
            r.add_source("s", &fc),
            Err(RendererError::DuplicateSource("s".into()))
        );
        r.add_layer(&spec("A", "s")).unwrap();
        assert_eq!(
            r.add_layer(&spec("A", "s")),
            Err(RendererError::DuplicateLayer("A".into()))
        );
    }

    #[test]
    fn layers_need_their_source() {
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options());
        assert_eq!(
            r.add_layer(&spec("A", "missing")),
            Err(RendererError::UnknownSource("missing".into()))
        );
    }

    #[test]
    fn layout_changes_require_existing_layer() {
        let log = CommandLog::default();
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options()).with_log(log.clone());
        assert!(r.set_layout_property("A", "visibility", "none").is_err());

        r.add_source("s", &FeatureCollection::default()).unwrap();
        r.add_layer(&spec("A", "s")).unwrap();
        assert_eq!(r.layout_property("A", "visibility"), Some("visible"));
        r.set_layout_property("A", "visibility", "none").unwrap();
        assert_eq!(r.layout_property("A", "visibility"), Some("none"));
        assert_eq!(log.visibility("A").as_deref(), Some("none"));
        assert_eq!(log.visibility("B"), None);
    }

    #[test]
    fn unreachable_images_fail_and_are_logged() {
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options())
            .with_unreachable(["bad.png".to_string()]);
        assert!(r.load_image("bad.png").is_err());
        assert!(r.load_image("good.png").is_ok());
        assert_eq!(
            r.log().count(|c| matches!(c, RenderCommand::LoadImage { ok: false, .. })),
            1
        );
    }

    #[test]
    fn source_keeps_geojson_payload() {
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options());
        let fc: FeatureCollection =
            [Feature::point("7", LonLat::new(21.0, 52.0), Map::new())].into_iter().collect();
        r.add_source("roadAccidents", &fc).unwrap();

        let data = r.source_data("roadAccidents").expect("source");
        assert_eq!(data["type"], json!("FeatureCollection"));
        assert_eq!(data["features"][0]["id"], json!("7"));
        assert!(r.source_data("other").is_none());
    }

    #[test]
    fn popup_content_is_replaced_and_cleared() {
        let mut r = RecordingRenderer::new(&MapConfig::default().map_options());
        assert!(r.popup().is_none());

        let payload = |id: &str, lon: f64| PopupPayload {
            id: Some(id.to_string()),
            properties: Map::new(),
            anchor: LonLat::new(lon, 0.0),
        };
        r.open_popup(&payload("a", 1.0));
        r.open_popup(&payload("b", -190.0));
        let popup = r.popup().expect("popup");
        assert_eq!(popup["id"], json!("b"));
        assert_eq!(popup["anchorLongitude"], json!(-190.0));

        r.close_popup();
        assert!(r.popup().is_none());
    }
}
