pub mod bounds;
pub mod geo;
pub mod math;

// Foundation crate: small, well-tested geodetic primitives only.
pub use bounds::*;
pub use geo::*;
