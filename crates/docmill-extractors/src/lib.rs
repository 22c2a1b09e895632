//! docmill-extractors - Extraction engines for PDFs and web pages.
//!
//! Every engine implements [`docmill_core::ExtractionEngine`] and returns the
//! common [`docmill_core::Extraction`] shape, so the fallback policy can swap
//! a cloud engine for a local one without callers noticing.
//!
//! | Domain | Local engine | Cloud engine |
//! |--------|--------------|--------------|
//! | PDF    | [`LopdfEngine`] | [`AzureDocumentEngine`] |
//! | Web    | [`ScraperEngine`] | [`DiffbotEngine`] |
//!
//! # Example
//!
//! ```ignore
//! use docmill_extractors::EngineFactory;
//!
//! let policy = EngineFactory::pdf_policy(Tier::Enterprise, &config)?;
//! let run = policy.run(&ExtractionRequest::pdf(bytes, "report.pdf")).await?;
//! ```

mod factory;
pub mod pdf;
pub mod web;

pub use factory::EngineFactory;
pub use pdf::{AzureDocumentEngine, LopdfEngine};
pub use web::{DiffbotEngine, ScraperEngine};
