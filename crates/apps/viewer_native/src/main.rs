use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use foundation::LonLat;
use layers::{FilterPanel, VisibilityBus};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use viewer::{MapConfig, MapController, MapEvent, RecordingRenderer};

/// Run one accident-map session against a headless renderer and print the
/// resulting map state as JSON.
#[derive(Parser, Debug)]
#[command(name = "viewer_native")]
struct Args {
    /// GeoJSON FeatureCollection of accidents.
    #[arg(long, env = "VIEWER_DATA", default_value = "assets/road_accidents.geojson")]
    data: PathBuf,

    /// JSON file overriding map settings.
    #[arg(long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Uncheck a layer's filter toggle.
    #[arg(long, value_name = "LAYER")]
    hide: Vec<String>,

    /// Check a layer's filter toggle.
    #[arg(long, value_name = "LAYER")]
    show: Vec<String>,

    /// Click feature INDEX on LAYER with the pointer at POINTER_LON.
    #[arg(long, value_name = "LAYER:INDEX:POINTER_LON")]
    click: Vec<ClickSpec>,

    /// Image URL the headless renderer fails to load.
    #[arg(long, value_name = "URL")]
    unreachable: Vec<String>,

    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone)]
struct ClickSpec {
    layer: String,
    index: usize,
    pointer_lon: f64,
}

impl FromStr for ClickSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split from the right so layer names may contain ':'.
        let mut parts = s.rsplitn(3, ':');
        let (Some(lon), Some(index), Some(layer)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected LAYER:INDEX:POINTER_LON, got {s:?}"));
        };
        Ok(Self {
            layer: layer.to_string(),
            index: index
                .parse()
                .map_err(|e| format!("bad feature index {index:?}: {e}"))?,
            pointer_lon: lon
                .parse()
                .map_err(|e| format!("bad pointer longitude {lon:?}: {e}"))?,
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => MapConfig::load(path).map_err(|e| e.to_string())?,
        None => MapConfig::default(),
    };
    let data = formats::load_feature_collection(&args.data).map_err(|e| e.to_string())?;
    info!(features = data.len(), path = %args.data.display(), "dataset loaded");

    let unreachable = args.unreachable.clone();
    let mut controller = MapController::initialize(config, move |opts| {
        RecordingRenderer::new(opts).with_unreachable(unreachable)
    });
    let mut bus = VisibilityBus::new();
    controller.attach_visibility_bus(&mut bus);

    let features = data.clone();
    controller.set_data(data).map_err(|e| e.to_string())?;
    controller
        .handle_event(MapEvent::Load)
        .map_err(|e| e.to_string())?;

    let mut panel = FilterPanel::new(&controller.layer_ids());
    for layer in &args.hide {
        panel.toggle(layer, false, &mut bus);
    }
    for layer in &args.show {
        panel.toggle(layer, true, &mut bus);
    }
    controller.pump_visibility();

    let mut popups = Vec::new();
    for click in &args.click {
        let Some(feature) = features.get(click.index) else {
            warn!(index = click.index, "no such feature; click skipped");
            continue;
        };
        let position = feature.position().unwrap_or(LonLat::new(click.pointer_lon, 0.0));
        controller
            .handle_event(MapEvent::Click {
                layer_id: click.layer.clone(),
                feature: feature.clone(),
                lng_lat: LonLat::new(click.pointer_lon, position.lat),
            })
            .map_err(|e| e.to_string())?;
        popups.push(
            controller
                .active_popup()
                .map(|p| p.to_json_value())
                .unwrap_or(Value::Null),
        );
    }

    let summary = summarize(&controller, &panel, popups);
    let out = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn summarize(
    controller: &MapController<RecordingRenderer>,
    panel: &FilterPanel,
    popups: Vec<Value>,
) -> Value {
    let store = controller.store();
    let layers: Vec<Value> = controller
        .layer_ids()
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "visibility": controller.layer_visibility(id.as_str()),
            })
        })
        .collect();

    json!({
        "state": controller.state().as_str(),
        "center": store.center().ok().map(|c| c.as_array()),
        "bounds": store.bounds().ok().map(|b| json!({"min": b.min, "max": b.max})),
        "layers": layers,
        "filters": panel.toggles(),
        "popups": popups,
        "metrics": controller.metrics().snapshot(),
    })
}
