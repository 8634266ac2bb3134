pub mod antimeridian;

pub use antimeridian::*;
