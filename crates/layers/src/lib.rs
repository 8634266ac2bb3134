pub mod filter;
pub mod layer;
pub mod registry;
pub mod symbology;

pub use filter::*;
pub use layer::*;
pub use registry::*;
pub use symbology::*;
