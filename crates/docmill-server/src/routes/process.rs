//! Document processing endpoints.

use axum::{
    extract::{multipart::Multipart, rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use docmill_core::{
    DocumentContent, DocumentRecord, Domain, ExtractionRequest, Processor, RecordMetadata, Tier,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::parse_tier;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Deserialize)]
pub struct WebpageRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
    pub content: DocumentContent,
    pub metadata: RecordMetadata,
}

impl ProcessResponse {
    fn success(message: impl Into<String>, record: DocumentRecord) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            document_id: record.document_id,
            timestamp: record.timestamp,
            content: record.content,
            metadata: record.metadata,
        }
    }
}

fn processor(state: &AppState, tier: Tier, domain: Domain) -> ApiResult<&Processor> {
    state.processor(tier, domain).ok_or_else(|| {
        ApiError::internal(format!("No {} processor configured for tier {}", domain, tier))
    })
}

/// Process an uploaded PDF.
/// POST /api/v1/:tier/process-pdf
pub async fn process_pdf(
    State(state): State<AppState>,
    Path(tier): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProcessResponse>> {
    let tier = parse_tier(&tier)?;
    let processor = processor(&state, tier, Domain::Pdf)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), "BAD_INPUT", e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
            return Err(ApiError::bad_request(format!(
                "File must be a PDF, got {}",
                content_type.as_deref().unwrap_or("no content type")
            )));
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), "BAD_INPUT", e.body_text()))?;
        upload = Some((data, filename));
        break;
    }

    let (data, filename) =
        upload.ok_or_else(|| ApiError::bad_request("Missing 'file' field in upload"))?;
    info!(%tier, filename = %filename, bytes = data.len(), "Processing PDF");

    let record = processor
        .process(ExtractionRequest::pdf(data.to_vec(), filename))
        .await
        .map_err(|e| {
            error!(%tier, error = %e, "Error processing PDF");
            ApiError::from_extract("Error processing PDF", e)
        })?;

    Ok(Json(ProcessResponse::success(
        "PDF processed successfully",
        record,
    )))
}

/// Process a web page by URL.
/// POST /api/v1/:tier/process-webpage
pub async fn process_webpage(
    State(state): State<AppState>,
    Path(tier): Path<String>,
    payload: Result<Json<WebpageRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessResponse>> {
    let tier = parse_tier(&tier)?;
    let processor = processor(&state, tier, Domain::Web)?;

    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = ExtractionRequest::url(body.url.trim())
        .map_err(|e| ApiError::from_extract("Invalid request", e))?;
    info!(%tier, url = %body.url, "Processing webpage");

    let record = processor.process(request).await.map_err(|e| {
        error!(%tier, url = %body.url, error = %e, "Error processing webpage");
        ApiError::from_extract("Error processing webpage", e)
    })?;

    Ok(Json(ProcessResponse::success(
        "Webpage processed successfully",
        record,
    )))
}
