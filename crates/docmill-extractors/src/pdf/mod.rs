//! PDF engines.

mod azure;
pub mod images;
mod local;

pub use azure::AzureDocumentEngine;
pub use local::LopdfEngine;
