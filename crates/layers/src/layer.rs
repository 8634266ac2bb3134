use std::fmt;

use runtime::EventBus;
use serde::Serialize;

/// Layer identifier; equal to the category value the layer groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Value of a layer's `visibility` layout property.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    None,
}

impl Visibility {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::None
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::None => "none",
        }
    }
}

/// Request to show or hide one layer, raised once per toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityChangeEvent {
    /// Raw name of the toggled control; may not match any layer.
    pub layer_id: String,
    pub visible: bool,
}

impl VisibilityChangeEvent {
    pub fn new(layer_id: impl Into<String>, visible: bool) -> Self {
        Self {
            layer_id: layer_id.into(),
            visible,
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_visible(self.visible)
    }
}

/// Channel from filter controls to whoever applies visibility.
pub type VisibilityBus = EventBus<VisibilityChangeEvent>;
