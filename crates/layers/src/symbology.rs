use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::layer::LayerId;

/// Piecewise-linear function of zoom, given as `(zoom, value)` stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomRamp {
    pub stops: Vec<(f64, f64)>,
}

impl ZoomRamp {
    pub fn linear(stops: &[(f64, f64)]) -> Self {
        Self {
            stops: stops.to_vec(),
        }
    }

    /// Style-expression form: `["interpolate", ["linear"], ["zoom"], z0, v0, ...]`.
    pub fn to_expression(&self) -> Value {
        let mut expr = vec![json!("interpolate"), json!(["linear"]), json!(["zoom"])];
        for (zoom, value) in &self.stops {
            expr.push(Value::from(*zoom));
            expr.push(Value::from(*value));
        }
        Value::Array(expr)
    }
}

/// Equality filter on one feature property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    pub property: String,
    pub value: String,
}

impl CategoryFilter {
    pub fn to_expression(&self) -> Value {
        json!(["==", self.property, self.value])
    }
}

/// Symbol layer drawing one category of the shared source with a marker icon.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLayerSpec {
    pub id: LayerId,
    pub source: String,
    pub icon_image: String,
    pub icon_size: ZoomRamp,
    pub icon_allow_overlap: bool,
    pub filter: CategoryFilter,
}

impl SymbolLayerSpec {
    pub fn for_category(
        id: LayerId,
        source: impl Into<String>,
        icon_image: impl Into<String>,
        icon_size: ZoomRamp,
        category_property: impl Into<String>,
    ) -> Self {
        let filter = CategoryFilter {
            property: category_property.into(),
            value: id.as_str().to_string(),
        };
        Self {
            id,
            source: source.into(),
            icon_image: icon_image.into(),
            icon_size,
            icon_allow_overlap: true,
            filter,
        }
    }

    pub fn to_style_json(&self) -> Value {
        json!({
            "id": self.id.as_str(),
            "type": "symbol",
            "source": self.source,
            "layout": {
                "icon-image": self.icon_image,
                "icon-allow-overlap": self.icon_allow_overlap,
                "icon-size": self.icon_size.to_expression(),
            },
            "filter": self.filter.to_expression(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SymbolLayerSpec, ZoomRamp};
    use crate::layer::LayerId;
    use serde_json::json;

    #[test]
    fn style_json_matches_symbol_layer_shape() {
        let spec = SymbolLayerSpec::for_category(
            LayerId::from("collision"),
            "roadAccidents",
            "custom-marker",
            ZoomRamp::linear(&[(5.0, 0.5), (15.0, 2.0)]),
            "type",
        );
        assert_eq!(
            spec.to_style_json(),
            json!({
                "id": "collision",
                "type": "symbol",
                "source": "roadAccidents",
                "layout": {
                    "icon-image": "custom-marker",
                    "icon-allow-overlap": true,
                    "icon-size": ["interpolate", ["linear"], ["zoom"], 5.0, 0.5, 15.0, 2.0],
                },
                "filter": ["==", "type", "collision"],
            })
        );
    }
}
