//! docmill-storage - Artifact store backends for docmill.
//!
//! # Supported Backends
//!
//! - **Memory** - process-local map, for tests and single-node setups
//! - **S3** (feature: `s3`) - any S3-compatible bucket

mod factory;
mod memory;

#[cfg(feature = "s3")]
mod s3;

pub use factory::StoreFactory;
pub use memory::MemoryStore;

#[cfg(feature = "s3")]
pub use s3::S3Store;
