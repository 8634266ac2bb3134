use std::path::PathBuf;

use foundation::{GeoBounds, LonLat};
use layers::{FilterPanel, LayerId, VisibilityBus};
use pretty_assertions::assert_eq;
use scene::{Feature, FeatureCollection, Geometry};
use serde_json::{Map, json};
use viewer::{
    CommandLog, ControllerState, MapConfig, MapController, MapEvent, RecordingRenderer,
    RenderCommand,
};

fn start(data: FeatureCollection) -> (MapController<RecordingRenderer>, CommandLog) {
    let log = CommandLog::default();
    let handle = log.clone();
    let mut controller = MapController::initialize(MapConfig::default(), move |opts| {
        RecordingRenderer::new(opts).with_log(handle)
    });
    controller.handle_event(MapEvent::Load).expect("map load");
    controller.set_data(data).expect("data");
    (controller, log)
}

fn categorized(items: &[(&str, f64, f64)]) -> FeatureCollection {
    items
        .iter()
        .enumerate()
        .map(|(i, (category, lon, lat))| {
            let mut props = Map::new();
            props.insert("type".to_string(), json!(category));
            Feature::point(format!("f{i}"), LonLat::new(*lon, *lat), props)
        })
        .collect()
}

#[test]
fn three_feature_scenario() {
    let (controller, _log) = start(categorized(&[
        ("A", 0.0, 0.0),
        ("B", 10.0, 10.0),
        ("A", 20.0, 0.0),
    ]));

    assert_eq!(controller.layer_ids(), vec![LayerId::from("A"), LayerId::from("B")]);
    let center = controller.store().center().expect("center");
    assert!((center.lon - 10.0).abs() < 1e-12);
    assert!((center.lat - 10.0 / 3.0).abs() < 1e-12);
    assert_eq!(
        controller.store().bounds().expect("bounds"),
        GeoBounds::new([0.0, 0.0], [20.0, 10.0])
    );
}

#[test]
fn filter_toggles_reach_the_renderer_in_order() {
    let (mut controller, log) = start(categorized(&[("A", 0.0, 0.0), ("B", 1.0, 1.0)]));
    let mut bus = VisibilityBus::new();
    controller.attach_visibility_bus(&mut bus);
    let mut panel = FilterPanel::new(&controller.layer_ids());

    panel.toggle("A", false, &mut bus);
    panel.toggle("B", false, &mut bus);
    panel.toggle("A", true, &mut bus);
    panel.toggle("unknown", false, &mut bus);
    assert_eq!(controller.pump_visibility(), 3);

    assert_eq!(log.visibility("A").as_deref(), Some("visible"));
    assert_eq!(log.visibility("B").as_deref(), Some("none"));
    assert_eq!(controller.metrics().counter("visibility.ignored"), 1);
}

#[test]
fn clicking_a_non_point_feature_makes_no_renderer_call() {
    let (mut controller, log) = start(categorized(&[("A", 0.0, 0.0)]));
    let before = log.commands().len();

    let mut props = Map::new();
    props.insert("type".to_string(), json!("A"));
    let line = Feature::new(
        Some("road-7".to_string()),
        Geometry::LineString(vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]),
        props,
    );
    controller
        .handle_event(MapEvent::Click {
            layer_id: "A".to_string(),
            feature: line,
            lng_lat: LonLat::new(0.5, 0.5),
        })
        .expect("click");

    assert!(controller.active_popup().is_none());
    assert_eq!(log.commands().len(), before);
    assert_eq!(controller.metrics().counter("popup.skipped"), 1);
}

#[test]
fn demo_dataset_end_to_end() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../apps/viewer_native/assets/road_accidents.geojson");
    let data = formats::load_feature_collection(path).expect("load demo data");
    let first = data.features[0].clone();
    let (mut controller, log) = start(data);

    assert_eq!(controller.state(), ControllerState::Ready);
    assert_eq!(
        controller.layer_ids(),
        vec![
            LayerId::from("collision"),
            LayerId::from("pedestrian"),
            LayerId::from("rollover"),
        ]
    );
    assert_eq!(
        log.count(|c| matches!(c, RenderCommand::AddSource { features: 6, .. })),
        1
    );

    // Zoomed out with a world copy to the east: pointer is one turn away.
    controller
        .handle_event(MapEvent::Click {
            layer_id: "collision".to_string(),
            feature: first,
            lng_lat: LonLat::new(381.0, 52.0),
        })
        .expect("click");
    let popup = controller.active_popup().expect("popup");
    assert!((popup.anchor.lon - (21.0122 + 360.0)).abs() < 1e-9);

    let content = popup.to_json_value();
    assert_eq!(content["id"], json!("1"));
    assert_eq!(content["severity"], json!("serious"));
    assert_eq!(content["anchorLatitude"], json!(52.2297));
}
