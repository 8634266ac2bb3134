use std::collections::HashSet;

use scene::FeatureCollection;

use crate::layer::{LayerId, Visibility};

/// Distinct category values of `collection`, in first-seen order.
///
/// Features whose `category_key` property is missing or not a string do not
/// contribute a layer. The result depends only on the input, so repeated calls
/// on the same collection agree.
pub fn derive_layers(collection: &FeatureCollection, category_key: &str) -> Vec<LayerId> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for feature in collection.iter() {
        let Some(category) = feature.property_str(category_key) else {
            continue;
        };
        if seen.insert(category) {
            out.push(LayerId::new(category));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerState {
    pub id: LayerId,
    pub visibility: Visibility,
}

/// Layers that exist on the renderer, in creation order.
///
/// Layers are only ever added; afterwards only their visibility changes.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<LayerState>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the layer was already registered.
    pub fn register(&mut self, id: LayerId) -> bool {
        if self.contains(id.as_str()) {
            return false;
        }
        self.layers.push(LayerState {
            id,
            visibility: Visibility::Visible,
        });
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&LayerState> {
        self.layers.iter().find(|l| l.id.as_str() == id)
    }

    pub fn visibility(&self, id: &str) -> Option<Visibility> {
        self.get(id).map(|l| l.visibility)
    }

    /// Returns `false` for unknown layers.
    pub fn set_visibility(&mut self, id: &str, visibility: Visibility) -> bool {
        match self.layers.iter_mut().find(|l| l.id.as_str() == id) {
            Some(layer) => {
                layer.visibility = visibility;
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerState> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
