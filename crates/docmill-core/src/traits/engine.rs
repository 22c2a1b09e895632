//! Extraction engine trait.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{Domain, EngineChoice, Extraction, ExtractionRequest};

/// A concrete extraction backend: a local library or a managed cloud API.
///
/// Engines turn their native output into the common [`Extraction`] shape, so
/// nothing downstream branches on engine identity.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Extract normalized content from the request.
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<Extraction>;

    /// Domain this engine handles.
    fn domain(&self) -> Domain;

    /// Whether this is a cloud or local engine.
    fn choice(&self) -> EngineChoice;

    /// Processor name reported in record metadata.
    fn name(&self) -> &str;
}
