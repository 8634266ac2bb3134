use serde::Serialize;

use crate::layer::{LayerId, VisibilityBus, VisibilityChangeEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterToggle {
    pub name: LayerId,
    pub checked: bool,
}

/// Checkbox list shown next to the map, one entry per layer.
///
/// Every toggle publishes exactly one [`VisibilityChangeEvent`] carrying the
/// control's raw name and its new checked state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPanel {
    toggles: Vec<FilterToggle>,
}

impl FilterPanel {
    /// All layers start checked, matching their default visibility.
    pub fn new(layer_ids: &[LayerId]) -> Self {
        Self {
            toggles: layer_ids
                .iter()
                .map(|id| FilterToggle {
                    name: id.clone(),
                    checked: true,
                })
                .collect(),
        }
    }

    pub fn toggles(&self) -> &[FilterToggle] {
        &self.toggles
    }

    pub fn is_checked(&self, name: &str) -> Option<bool> {
        self.toggles
            .iter()
            .find(|t| t.name.as_str() == name)
            .map(|t| t.checked)
    }

    pub fn toggle(&mut self, name: &str, checked: bool, bus: &mut VisibilityBus) {
        if let Some(t) = self.toggles.iter_mut().find(|t| t.name.as_str() == name) {
            t.checked = checked;
        }
        bus.publish(VisibilityChangeEvent::new(name, checked));
    }
}
