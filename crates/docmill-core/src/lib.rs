//! docmill-core - Core library for docmill.
//!
//! This crate provides the document record, engine and store traits, the
//! normalization rules, and the cloud-first fallback policy shared by the
//! PDF and web pipelines.
//!
//! # Example
//!
//! ```ignore
//! use docmill_core::{FallbackPolicy, Processor, ExtractionRequest, Tier};
//!
//! let policy = FallbackPolicy::new(Some(azure), lopdf)?;
//! let processor = Processor::new(Tier::Enterprise, policy, store, timeout);
//!
//! let record = processor.process(ExtractionRequest::pdf(bytes, "report.pdf")).await?;
//! println!("{}", record.document_id);
//! ```

pub mod config;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod persist;
pub mod processor;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, AzureConfig, DiffbotConfig, ServerConfig, StorageBackend, StorageConfig,
    WebFetchConfig,
};
pub use error::{ErrorKind, ExtractError, ExtractResult, StorageError, StorageResult};
pub use fallback::{EngineRun, FallbackPolicy};
pub use processor::{engine_tag, Processor};
pub use traits::{ArtifactStore, ExtractionEngine};
pub use types::{
    DocumentContent, DocumentRecord, Domain, EmbeddedImage, EngineChoice, Extraction,
    ExtractionRequest, ImageDescriptor, Link, RecordMetadata, RemoteImage, Table, Tier,
};
