//! Core types for docmill.

mod record;
mod request;

pub use record::*;
pub use request::*;
