//! Local web engine: plain HTTP fetch plus scraper.

use std::time::Duration;

use async_trait::async_trait;
use docmill_core::{
    Domain, EngineChoice, ExtractError, ExtractResult, Extraction, ExtractionEngine,
    ExtractionRequest, WebFetchConfig,
};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::parse::parse_page;

/// Web engine that fetches the page itself and parses the markup locally.
pub struct ScraperEngine {
    client: Client,
    timeout: Duration,
}

impl ScraperEngine {
    /// Create a new engine from fetch settings.
    pub fn new(config: &WebFetchConfig) -> ExtractResult<Self> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for web fetches");
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                ExtractError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ExtractError {
        if err.is_timeout() {
            ExtractError::timeout(format!("Fetching {}", url), self.timeout)
        } else {
            ExtractError::network(err)
        }
    }
}

#[async_trait]
impl ExtractionEngine for ScraperEngine {
    #[instrument(skip_all, fields(engine = "scraper"))]
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<Extraction> {
        let url = request.as_url()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(ExtractError::Fetch {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Relative references resolve against where the page ended up.
        let base = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        debug!(url = %base, bytes = html.len(), "Fetched page");

        let page = tokio::task::spawn_blocking(move || parse_page(&html, &base)).await?;

        let mut extraction = Extraction::new(page.content);
        extraction.metadata = page.metadata;
        extraction.metadata.insert("url".to_string(), url.into());
        Ok(extraction)
    }

    fn domain(&self) -> Domain {
        Domain::Web
    }

    fn choice(&self) -> EngineChoice {
        EngineChoice::Local
    }

    fn name(&self) -> &str {
        "scraper"
    }
}
