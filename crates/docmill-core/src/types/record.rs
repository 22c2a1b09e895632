//! The canonical document record every pipeline produces.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A rectangular table: rows of equal-length cell strings.
pub type Table = Vec<Vec<String>>;

/// Raster image pulled out of a PDF binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Encoded image bytes (base64 on the wire).
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub data: Vec<u8>,
    /// File extension matching the encoding, e.g. `jpg` or `png`.
    pub ext: String,
    /// 1-indexed page the image was found on.
    pub page: u32,
    /// 0-indexed position among that page's images.
    pub index: usize,
}

/// Image referenced by a web page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    /// Absolute image URL.
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
}

/// An image descriptor carries either an inline payload or a URL, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageDescriptor {
    Embedded(EmbeddedImage),
    Remote(RemoteImage),
}

impl ImageDescriptor {
    /// Inline payload, if this image came from a PDF.
    pub fn as_embedded(&self) -> Option<&EmbeddedImage> {
        match self {
            Self::Embedded(image) => Some(image),
            Self::Remote(_) => None,
        }
    }
}

/// Hyperlink found on a web page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute target URL.
    pub url: String,
    /// Anchor text.
    #[serde(default)]
    pub text: String,
}

/// Normalized content of a document, identical in shape across engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    /// Ordered text segments. Joined with a blank line when flattened.
    pub text: Vec<String>,
    pub tables: Vec<Table>,
    pub images: Vec<ImageDescriptor>,
    pub links: Vec<Link>,
    /// Field label to value; only the cloud PDF engine fills this.
    pub key_value_pairs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw markup, kept for storage only.
    #[serde(skip)]
    pub html: Option<String>,
}

impl DocumentContent {
    /// Flatten the text segments using the documented join rule.
    pub fn joined_text(&self) -> String {
        crate::normalize::join_segments(&self.text)
    }

    /// Whether the content carries anything at all.
    pub fn is_empty(&self) -> bool {
        self.text.iter().all(|t| t.trim().is_empty())
            && self.tables.is_empty()
            && self.images.is_empty()
            && self.links.is_empty()
            && self.key_value_pairs.is_empty()
    }
}

/// Output of a single engine run, before the record is assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub content: DocumentContent,
    /// Total pages in the source (PDF engines).
    pub page_count: Option<usize>,
    /// Engine-specific metadata merged into the record metadata.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Extraction {
    /// Create an extraction from content.
    pub fn new(content: DocumentContent) -> Self {
        Self {
            content,
            page_count: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set the page count.
    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }

    /// Add metadata entry.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Record-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Engine that actually produced the content.
    pub processor: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// Why the cloud engine was replaced, when it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Logical artifact name to storage key.
    #[serde(default)]
    pub storage_paths: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Canonical output of a successful extraction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
    pub content: DocumentContent,
    pub metadata: RecordMetadata,
}

fn to_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}
