//! Core traits for docmill engines and stores.

mod engine;
mod store;

pub use engine::*;
pub use store::*;
