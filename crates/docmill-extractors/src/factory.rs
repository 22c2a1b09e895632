//! Factory for creating engines and per-tier fallback policies.

use std::sync::Arc;

use docmill_core::{
    AppConfig, AzureConfig, DiffbotConfig, ExtractResult, ExtractionEngine, FallbackPolicy, Tier,
    WebFetchConfig,
};
use tracing::{info, warn};

use crate::pdf::{AzureDocumentEngine, LopdfEngine};
use crate::web::{DiffbotEngine, ScraperEngine};

/// Factory for creating extraction engines.
pub struct EngineFactory;

impl EngineFactory {
    /// Create the local PDF engine.
    pub fn pdf_local() -> Arc<dyn ExtractionEngine> {
        Arc::new(LopdfEngine::new())
    }

    /// Create the cloud PDF engine, or `None` when it is not configured.
    pub fn pdf_cloud(config: &AzureConfig) -> Option<Arc<dyn ExtractionEngine>> {
        if !config.is_configured() {
            warn!("Azure Document Intelligence credentials not found; enterprise PDF requests use lopdf");
            return None;
        }
        match AzureDocumentEngine::new(config) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                warn!(error = %e, "Azure Document Intelligence unavailable");
                None
            }
        }
    }

    /// Create the local web engine.
    pub fn web_local(config: &WebFetchConfig) -> ExtractResult<Arc<dyn ExtractionEngine>> {
        Ok(Arc::new(ScraperEngine::new(config)?))
    }

    /// Create the cloud web engine, or `None` when it is not configured.
    pub fn web_cloud(config: &DiffbotConfig) -> Option<Arc<dyn ExtractionEngine>> {
        if !config.is_configured() {
            warn!("Diffbot token not found; enterprise web requests use scraper");
            return None;
        }
        match DiffbotEngine::new(config) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                warn!(error = %e, "Diffbot unavailable");
                None
            }
        }
    }

    /// Build the PDF policy for a tier. The opensource tier never goes to the cloud.
    pub fn pdf_policy(tier: Tier, config: &AppConfig) -> ExtractResult<FallbackPolicy> {
        let local = Self::pdf_local();
        let policy = match tier {
            Tier::Opensource => FallbackPolicy::local_only(local),
            Tier::Enterprise => FallbackPolicy::new(Self::pdf_cloud(&config.azure), local)?,
        };
        info!(
            %tier,
            cloud = policy.cloud_name().unwrap_or("none"),
            local = policy.local_name(),
            "PDF policy ready"
        );
        Ok(policy)
    }

    /// Build the web policy for a tier. The opensource tier never goes to the cloud.
    pub fn web_policy(tier: Tier, config: &AppConfig) -> ExtractResult<FallbackPolicy> {
        let local = Self::web_local(&config.web)?;
        let policy = match tier {
            Tier::Opensource => FallbackPolicy::local_only(local),
            Tier::Enterprise => FallbackPolicy::new(Self::web_cloud(&config.diffbot), local)?,
        };
        info!(
            %tier,
            cloud = policy.cloud_name().unwrap_or("none"),
            local = policy.local_name(),
            "Web policy ready"
        );
        Ok(policy)
    }
}
