//! Error types for the OneClick protocol layer.

mod call;
mod store;

pub use call::*;
pub use store::*;
