use foundation::LonLat;
use foundation::math::wrap_toward;
use serde_json::{Map, Value};

use crate::feature::Feature;

/// Detail content and anchor for the popup opened on a feature click.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupPayload {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// Antimeridian-corrected position the popup is pinned to.
    pub anchor: LonLat,
}

impl PopupPayload {
    /// Flat JSON object: `id`, then every property, then the anchor.
    ///
    /// A property named `id` takes precedence over the feature id.
    pub fn to_json_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(id) = &self.id {
            obj.insert("id".to_string(), Value::String(id.clone()));
        }
        for (k, v) in &self.properties {
            obj.insert(k.clone(), v.clone());
        }
        obj.insert("anchorLongitude".to_string(), Value::from(self.anchor.lon));
        obj.insert("anchorLatitude".to_string(), Value::from(self.anchor.lat));
        Value::Object(obj)
    }
}

/// Build the popup for a click on `feature` with the pointer at `pointer_lon`.
///
/// Returns `None` for anything but a point feature. The anchor keeps the
/// feature's latitude; its longitude is moved onto the world copy nearest the
/// pointer.
pub fn resolve_popup(feature: &Feature, pointer_lon: f64) -> Option<PopupPayload> {
    let position = feature.geometry.as_point()?;
    let anchor = LonLat::new(wrap_toward(position.lon, pointer_lon), position.lat);
    Some(PopupPayload {
        id: feature.id.clone(),
        properties: feature.properties.clone(),
        anchor,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_popup;
    use crate::feature::{Feature, Geometry};
    use foundation::LonLat;
    use serde_json::{Map, Value, json};

    fn accident(lon: f64, lat: f64) -> Feature {
        let props = json!({"type": "collision", "severity": "minor"});
        Feature::point("acc-1", LonLat::new(lon, lat), props.as_object().cloned().unwrap())
    }

    #[test]
    fn corrects_across_the_antimeridian() {
        let payload = resolve_popup(&accident(170.0, 12.5), -170.0).expect("payload");
        assert_eq!(payload.anchor, LonLat::new(-190.0, 12.5));
    }

    #[test]
    fn leaves_nearby_clicks_alone() {
        let payload = resolve_popup(&accident(10.0, 0.0), 10.0).expect("payload");
        assert_eq!(payload.anchor, LonLat::new(10.0, 0.0));
    }

    #[test]
    fn non_point_features_are_skipped() {
        let line = Feature::new(
            Some("road".into()),
            Geometry::LineString(vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]),
            Map::new(),
        );
        assert!(resolve_popup(&line, 0.5).is_none());
    }

    #[test]
    fn payload_merges_id_properties_and_anchor() {
        let payload = resolve_popup(&accident(170.0, 12.5), -170.0).unwrap();
        assert_eq!(
            payload.to_json_value(),
            json!({
                "id": "acc-1",
                "type": "collision",
                "severity": "minor",
                "anchorLongitude": -190.0,
                "anchorLatitude": 12.5,
            })
        );
    }

    #[test]
    fn property_id_overrides_feature_id() {
        let mut f = accident(0.0, 0.0);
        f.properties.insert("id".into(), Value::from(99));
        let v = resolve_popup(&f, 0.0).unwrap().to_json_value();
        assert_eq!(v["id"], json!(99));
    }
}
