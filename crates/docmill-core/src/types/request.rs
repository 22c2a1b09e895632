//! Request-side types: what to extract, and along which axis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{ExtractError, ExtractResult};

/// Which kind of source a pipeline handles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Uploaded PDF documents.
    Pdf,
    /// Web pages fetched by URL.
    Web,
}

/// Which engine family a request targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Local libraries only.
    Opensource,
    /// Cloud engines first, local engines as fallback.
    Enterprise,
}

/// Engine class selected for a single request. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Managed cloud API.
    Cloud,
    /// Local library.
    Local,
}

/// Source to extract from. Immutable once created.
#[derive(Debug, Clone)]
pub enum ExtractionRequest {
    /// PDF bytes with the uploaded file name.
    Pdf { data: Arc<[u8]>, filename: String },
    /// Absolute http(s) URL of a web page.
    Url(String),
}

impl ExtractionRequest {
    /// Create a PDF request.
    pub fn pdf(data: impl Into<Arc<[u8]>>, filename: impl Into<String>) -> Self {
        Self::Pdf {
            data: data.into(),
            filename: filename.into(),
        }
    }

    /// Create a web page request, validating that the URL is absolute http(s).
    pub fn url(url: impl Into<String>) -> ExtractResult<Self> {
        let url = url.into();
        let parsed = url::Url::parse(&url)
            .map_err(|e| ExtractError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self::Url(url)),
            scheme => Err(ExtractError::InvalidInput(format!(
                "Unsupported URL scheme '{}'; expected http or https",
                scheme
            ))),
        }
    }

    /// Domain this request belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            Self::Pdf { .. } => Domain::Pdf,
            Self::Url(_) => Domain::Web,
        }
    }

    /// PDF payload, or an error for URL requests.
    pub fn as_pdf(&self) -> ExtractResult<(&Arc<[u8]>, &str)> {
        match self {
            Self::Pdf { data, filename } => Ok((data, filename.as_str())),
            Self::Url(_) => Err(ExtractError::InvalidInput(
                "Expected a PDF document, got a URL".to_string(),
            )),
        }
    }

    /// URL, or an error for PDF requests.
    pub fn as_url(&self) -> ExtractResult<&str> {
        match self {
            Self::Url(url) => Ok(url),
            Self::Pdf { .. } => Err(ExtractError::InvalidInput(
                "Expected a URL, got a PDF document".to_string(),
            )),
        }
    }

    /// Bytes the document id token is derived from.
    pub fn identity_bytes(&self) -> &[u8] {
        match self {
            Self::Pdf { data, .. } => &data[..],
            Self::Url(url) => url.as_bytes(),
        }
    }
}
