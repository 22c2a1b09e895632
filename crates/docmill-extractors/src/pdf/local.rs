//! Local PDF engine backed by lopdf.

use async_trait::async_trait;
use docmill_core::{
    DocumentContent, Domain, EngineChoice, ExtractError, ExtractResult, Extraction,
    ExtractionEngine, ExtractionRequest, ImageDescriptor,
};
use lopdf::{Document, Object};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::images::extract_images;

/// Info dictionary keys copied into the record metadata.
const INFO_FIELDS: &[(&[u8], &str)] = &[
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creation_date"),
    (b"ModDate", "modification_date"),
];

/// PDF engine that runs entirely in-process.
///
/// Parsing is synchronous, so each extraction runs on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    /// Create a new local PDF engine.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractionEngine for LopdfEngine {
    #[instrument(skip_all, fields(engine = "lopdf"))]
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<Extraction> {
        let (data, filename) = request.as_pdf()?;
        let data = data.clone();
        let filename = filename.to_string();

        tokio::task::spawn_blocking(move || extract_pdf(&data, &filename)).await?
    }

    fn domain(&self) -> Domain {
        Domain::Pdf
    }

    fn choice(&self) -> EngineChoice {
        EngineChoice::Local
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Parse a PDF: non-blank page text, embedded images, and document info.
pub(crate) fn extract_pdf(data: &[u8], filename: &str) -> ExtractResult<Extraction> {
    let doc = load_document(data)?;
    let pages = doc.get_pages();

    let mut text = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let page_text = doc
            .extract_text(&[page_number])
            .map_err(|e| ExtractError::Pdf(format!("Failed to read page {}: {}", page_number, e)))?;
        let page_text = page_text.trim();
        if !page_text.is_empty() {
            text.push(page_text.to_string());
        }
    }

    let images = extract_images(&doc)
        .into_iter()
        .map(ImageDescriptor::Embedded)
        .collect();

    let mut metadata = document_info(&doc);
    let title = metadata
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    metadata.insert("filename".to_string(), filename.into());
    metadata.insert("file_size".to_string(), data.len().into());

    debug!(pages = pages.len(), segments = text.len(), "Parsed PDF");

    let mut extraction = Extraction::new(DocumentContent {
        text,
        images,
        title,
        ..Default::default()
    })
    .with_page_count(pages.len());
    extraction.metadata = metadata;
    Ok(extraction)
}

/// Open a PDF from memory. Encrypted documents are rejected.
pub(crate) fn load_document(data: &[u8]) -> ExtractResult<Document> {
    if data.is_empty() {
        return Err(ExtractError::InvalidInput("Empty PDF upload".to_string()));
    }

    let doc = Document::load_mem(data)
        .map_err(|e| ExtractError::Pdf(format!("Failed to load PDF: {}", e)))?;
    if doc.is_encrypted() {
        return Err(ExtractError::InvalidInput(
            "Encrypted PDFs are not supported".to_string(),
        ));
    }
    Ok(doc)
}

fn document_info(doc: &Document) -> Map<String, Value> {
    let mut metadata = Map::new();

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|object| match object {
            Object::Reference(id) => doc.get_object(*id).ok(),
            other => Some(other),
        })
        .and_then(|object| object.as_dict().ok());

    let Some(info) = info else {
        return metadata;
    };

    for (key, name) in INFO_FIELDS {
        if let Ok(Object::String(bytes, _)) = info.get(key) {
            let value = decode_pdf_string(bytes);
            if !value.trim().is_empty() {
                metadata.insert(name.to_string(), Value::String(value));
            }
        }
    }
    metadata
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM, bytes otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        },
    }
}
