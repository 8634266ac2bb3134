use foundation::LonLat;
use scene::{Feature, FeatureCollection, Geometry};
use serde_json::{Map, Value};

#[derive(Debug)]
pub enum FeatureCollectionError {
    Json(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureCollectionError::Json(e) => write!(f, "JSON parse error: {e}"),
            FeatureCollectionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FeatureCollectionError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureCollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureCollectionError::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub fn parse_feature_collection(payload: &str) -> Result<FeatureCollection, FeatureCollectionError> {
    let value: Value = serde_json::from_str(payload).map_err(FeatureCollectionError::Json)?;
    feature_collection_from_value(&value)
}

pub fn feature_collection_from_value(
    value: &Value,
) -> Result<FeatureCollection, FeatureCollectionError> {
    let obj = value
        .as_object()
        .ok_or(FeatureCollectionError::NotAFeatureCollection)?;
    if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(FeatureCollectionError::NotAFeatureCollection);
    }
    let raw = obj
        .get("features")
        .and_then(Value::as_array)
        .ok_or(FeatureCollectionError::NotAFeatureCollection)?;

    raw.iter()
        .enumerate()
        .map(|(index, v)| {
            parse_feature(v).map_err(|reason| FeatureCollectionError::InvalidFeature { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FeatureCollection::new)
}

/// Serialize back to a GeoJSON FeatureCollection, e.g. as a renderer source payload.
///
/// Property ordering may differ from the input; numeric ids come back as strings.
pub fn feature_collection_to_value(collection: &FeatureCollection) -> Value {
    let features = collection
        .iter()
        .map(|feature| {
            let mut obj = Map::new();
            obj.insert("type".to_string(), Value::from("Feature"));
            if let Some(id) = &feature.id {
                obj.insert("id".to_string(), Value::from(id.as_str()));
            }
            obj.insert(
                "properties".to_string(),
                Value::Object(feature.properties.clone()),
            );
            obj.insert("geometry".to_string(), geometry_to_value(&feature.geometry));
            Value::Object(obj)
        })
        .collect();

    let mut root = Map::new();
    root.insert("type".to_string(), Value::from("FeatureCollection"));
    root.insert("features".to_string(), Value::Array(features));
    Value::Object(root)
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = parse_geometry(obj.get("geometry").ok_or("feature missing geometry")?)?;

    Ok(Feature::new(id, geometry, properties))
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates")?;

    let geometry = match ty {
        "Point" => Geometry::Point(position(coords)?),
        "MultiPoint" => Geometry::MultiPoint(each(coords, position)?),
        "LineString" => Geometry::LineString(each(coords, position)?),
        "MultiLineString" => Geometry::MultiLineString(each(coords, |c| each(c, position))?),
        "Polygon" => Geometry::Polygon(each(coords, |c| each(c, position))?),
        "MultiPolygon" => {
            Geometry::MultiPolygon(each(coords, |p| each(p, |r| each(r, position)))?)
        }
        other => return Err(format!("unsupported geometry type: {other}")),
    };
    Ok(geometry)
}

fn each<T>(
    value: &Value,
    item: impl Fn(&Value) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    value
        .as_array()
        .ok_or_else(|| "coordinates must be an array".to_string())?
        .iter()
        .map(item)
        .collect()
}

fn position(value: &Value) -> Result<LonLat, String> {
    let arr = value.as_array().ok_or("position must be an array")?;
    let [lon, lat, ..] = arr.as_slice() else {
        return Err("position must have [lon, lat]".to_string());
    };
    let lon = lon.as_f64().ok_or("longitude must be a number")?;
    let lat = lat.as_f64().ok_or("latitude must be a number")?;
    Ok(LonLat::new(lon, lat))
}

fn geometry_to_value(geometry: &Geometry) -> Value {
    let coordinates = match geometry {
        Geometry::Point(p) => position_to_value(p),
        Geometry::MultiPoint(ps) | Geometry::LineString(ps) => positions_to_value(ps),
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            Value::Array(lines.iter().map(|l| positions_to_value(l)).collect())
        }
        Geometry::MultiPolygon(polys) => Value::Array(
            polys
                .iter()
                .map(|rings| Value::Array(rings.iter().map(|r| positions_to_value(r)).collect()))
                .collect(),
        ),
    };

    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::from(geometry.kind().as_str()));
    obj.insert("coordinates".to_string(), coordinates);
    Value::Object(obj)
}

fn position_to_value(p: &LonLat) -> Value {
    Value::Array(vec![Value::from(p.lon), Value::from(p.lat)])
}

fn positions_to_value(ps: &[LonLat]) -> Value {
    Value::Array(ps.iter().map(position_to_value).collect())
}
