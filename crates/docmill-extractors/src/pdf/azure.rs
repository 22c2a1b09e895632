//! Cloud PDF engine backed by Azure Document Intelligence.
//!
//! Analysis is a long-running operation: the document is submitted, then the
//! returned operation URL is polled until it reaches a terminal state. The
//! whole exchange is bounded by the analyze timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use docmill_core::normalize::{assemble_table, TableCell};
use docmill_core::{
    AzureConfig, DocumentContent, Domain, EngineChoice, ExtractError, ExtractResult, Extraction,
    ExtractionEngine, ExtractionRequest, ImageDescriptor,
};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::images::extract_images;
use super::local::load_document;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Azure Document Intelligence engine.
pub struct AzureDocumentEngine {
    client: Client,
    endpoint: String,
    key: SecretString,
    model: String,
    api_version: String,
    analyze_timeout: Duration,
    poll_interval: Duration,
    max_retries: usize,
    retry_delay: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    analyze_result: Option<AnalyzeResult>,
    error: Option<OperationError>,
}

#[derive(Debug, Default, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    model_id: Option<String>,
    #[serde(default)]
    pages: Vec<AnalyzedPage>,
    #[serde(default)]
    tables: Vec<AnalyzedTable>,
    #[serde(default)]
    key_value_pairs: Vec<KeyValuePair>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzedPage {
    #[serde(default)]
    lines: Vec<AnalyzedLine>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedLine {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzedTable {
    #[serde(default)]
    cells: Vec<AnalyzedCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzedCell {
    row_index: usize,
    column_index: usize,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct KeyValuePair {
    key: Option<KeyValueElement>,
    value: Option<KeyValueElement>,
}

#[derive(Debug, Deserialize)]
struct KeyValueElement {
    #[serde(default)]
    content: String,
}

impl AzureDocumentEngine {
    /// Create a new engine. Fails when the endpoint or key is missing.
    pub fn new(config: &AzureConfig) -> ExtractResult<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                ExtractError::Configuration(
                    "Azure Document Intelligence endpoint required. Set AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT.".to_string(),
                )
            })?;
        let key = config.key.clone().ok_or_else(|| {
            ExtractError::Configuration(
                "Azure Document Intelligence key required. Set AZURE_DOCUMENT_INTELLIGENCE_KEY."
                    .to_string(),
            )
        })?;

        let client = Client::builder()
            .build()
            .map_err(|e| {
                ExtractError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            analyze_timeout: config.analyze_timeout(),
            poll_interval: config.poll_interval(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Override the bound on submit plus polling.
    pub fn with_analyze_timeout(mut self, timeout: Duration) -> Self {
        self.analyze_timeout = timeout;
        self
    }

    /// Override the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override submission retries.
    pub fn with_retry(mut self, max_retries: usize, delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = delay;
        self
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.model, self.api_version
        )
    }

    /// Submit the document and return the operation URL.
    async fn submit(&self, data: &[u8]) -> ExtractResult<String> {
        let submit_once = || async {
            let response = self
                .client
                .post(self.analyze_url())
                .header(KEY_HEADER, self.key.expose_secret())
                .header(CONTENT_TYPE, "application/pdf")
                .body(data.to_vec())
                .send()
                .await
                .map_err(ExtractError::network)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExtractError::from_http_status(status.as_u16(), &body));
            }

            response
                .headers()
                .get("operation-location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    ExtractError::Parse("Analyze response has no Operation-Location header".into())
                })
        };

        submit_once
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(self.max_retries)
                    .with_min_delay(self.retry_delay),
            )
            .when(ExtractError::is_transient)
            .notify(|err, dur| {
                warn!(error = %err, retry_in = ?dur, "Document submission failed, retrying");
            })
            .await
    }

    /// Poll the operation until it succeeds or fails.
    async fn poll(&self, operation_url: &str) -> ExtractResult<AnalyzeResult> {
        loop {
            let response = self
                .client
                .get(operation_url)
                .header(KEY_HEADER, self.key.expose_secret())
                .send()
                .await
                .map_err(ExtractError::network)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExtractError::from_http_status(status.as_u16(), &body));
            }

            let wait = retry_after(response.headers()).unwrap_or(self.poll_interval);
            let operation: AnalyzeOperation = response
                .json()
                .await
                .map_err(|e| {
                    ExtractError::Parse(format!("Failed to parse analyze status: {}", e))
                })?;

            match operation.status.to_ascii_lowercase().as_str() {
                "succeeded" => {
                    return operation.analyze_result.ok_or_else(|| {
                        ExtractError::Parse("Succeeded operation has no analyzeResult".into())
                    })
                }
                "failed" => {
                    let error = operation.error.unwrap_or_default();
                    return Err(ExtractError::Analysis(format!(
                        "{}: {}",
                        error.code, error.message
                    )));
                }
                other => {
                    debug!(status = other, "Analysis in progress");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    async fn analyze(&self, data: &[u8]) -> ExtractResult<AnalyzeResult> {
        let operation_url = self.submit(data).await?;
        debug!(operation = %operation_url, "Document submitted");
        self.poll(&operation_url).await
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Turn the analysis into the common content shape.
fn normalize(result: AnalyzeResult) -> ExtractResult<(DocumentContent, Option<String>)> {
    if result.pages.is_empty() {
        return Err(ExtractError::EmptyResult(
            "Document analysis returned no pages".to_string(),
        ));
    }

    let text = result
        .pages
        .iter()
        .map(|page| {
            page.lines
                .iter()
                .map(|line| line.content.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    let tables = result
        .tables
        .into_iter()
        .filter_map(|table| {
            assemble_table(
                table
                    .cells
                    .into_iter()
                    .map(|c| TableCell::new(c.row_index, c.column_index, c.content)),
            )
        })
        .collect();

    let key_value_pairs = result
        .key_value_pairs
        .into_iter()
        .filter_map(|pair| {
            let key = pair.key?.content.trim().to_string();
            let value = pair.value?.content.trim().to_string();
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect();

    let content = DocumentContent {
        text,
        tables,
        key_value_pairs,
        ..Default::default()
    };
    Ok((content, result.model_id))
}

#[async_trait]
impl ExtractionEngine for AzureDocumentEngine {
    #[instrument(skip_all, fields(engine = "azure-document-intelligence"))]
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<Extraction> {
        let (data, filename) = request.as_pdf()?;
        if data.is_empty() {
            return Err(ExtractError::InvalidInput("Empty PDF upload".to_string()));
        }

        let result = tokio::time::timeout(self.analyze_timeout, self.analyze(data))
            .await
            .map_err(|_| ExtractError::timeout("Document analysis", self.analyze_timeout))??;

        let (mut content, model_id) = normalize(result)?;
        let page_count = content.text.len();

        // The service reports no image payloads; take them from the file itself.
        let bytes = Arc::clone(data);
        let images = tokio::task::spawn_blocking(move || {
            load_document(&bytes).map(|doc| extract_images(&doc))
        })
        .await;
        content.images = match images {
            Ok(Ok(images)) => images.into_iter().map(ImageDescriptor::Embedded).collect(),
            Ok(Err(e)) => {
                warn!(error = %e, "Image extraction failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Image extraction task failed");
                Vec::new()
            }
        };

        Ok(Extraction::new(content)
            .with_page_count(page_count)
            .with_metadata("filename", filename)
            .with_metadata("file_size", data.len())
            .with_metadata("model_id", model_id.unwrap_or_else(|| self.model.clone())))
    }

    fn domain(&self) -> Domain {
        Domain::Pdf
    }

    fn choice(&self) -> EngineChoice {
        EngineChoice::Cloud
    }

    fn name(&self) -> &str {
        "azure-document-intelligence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_rejected() {
        let result = AzureDocumentEngine::new(&AzureConfig::default());
        assert!(matches!(result, Err(ExtractError::Configuration(_))));
    }

    #[test]
    fn test_analyze_url() {
        let config = AzureConfig {
            endpoint: Some("https://di.example.com/".to_string()),
            key: Some(SecretString::new("k".to_string())),
            ..Default::default()
        };
        let engine = AzureDocumentEngine::new(&config).unwrap();
        assert_eq!(
            engine.analyze_url(),
            "https://di.example.com/formrecognizer/documentModels/prebuilt-document:analyze?api-version=2023-07-31"
        );
    }

    #[test]
    fn test_normalize_keeps_complete_pairs_only() {
        let result: AnalyzeResult = serde_json::from_value(serde_json::json!({
            "pages": [{"pageNumber": 1, "lines": [{"content": "Invoice"}, {"content": "Total"}]}],
            "keyValuePairs": [
                {"key": {"content": "Total"}, "value": {"content": "42"}},
                {"key": {"content": "Notes"}},
                {"key": {"content": " "}, "value": {"content": "x"}}
            ]
        }))
        .unwrap();

        let (content, _) = normalize(result).unwrap();
        assert_eq!(content.text, vec!["Invoice\nTotal"]);
        assert_eq!(content.key_value_pairs.len(), 1);
        assert_eq!(content.key_value_pairs["Total"], "42");
    }

    #[test]
    fn test_normalize_no_pages_is_empty_result() {
        let result: AnalyzeResult =
            serde_json::from_value(serde_json::json!({"pages": []})).unwrap();
        assert!(matches!(normalize(result), Err(ExtractError::EmptyResult(_))));
    }
}
