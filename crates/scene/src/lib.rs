pub mod feature;
pub mod popup;
pub mod store;

pub use feature::*;
pub use popup::*;
pub use store::*;
