pub mod event_bus;
pub mod join;
pub mod metrics;

pub use event_bus::*;
pub use join::*;
pub use metrics::*;
