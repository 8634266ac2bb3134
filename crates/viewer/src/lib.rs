//! Map-state synchronization for the accident map.
//!
//! [`MapController`] owns the map engine (behind [`MapRenderer`]), frames the
//! dataset, creates one symbol layer per accident category, and turns pointer
//! events and filter toggles into popups and layer visibility changes.

pub mod config;
pub mod controller;
pub mod error;
pub mod headless;
pub mod renderer;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use headless::*;
pub use renderer::*;
