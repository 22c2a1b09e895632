//! Health check and root endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use docmill_core::{Domain, Tier};
use serde::Serialize;

use super::parse_tier;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceStatus,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub opensource: OpensourceServices,
    pub enterprise: EnterpriseServices,
    pub storage: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OpensourceServices {
    pub pdf_processor: &'static str,
    pub web_processor: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EnterpriseServices {
    pub azure_di: &'static str,
    pub diffbot: &'static str,
}

fn availability(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "unavailable"
    }
}

/// Service banner.
/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Document Processing API".to_string(),
    })
}

/// Health check endpoint.
/// GET /api/v1/:tier/health
pub async fn health_check(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> ApiResult<Json<HealthResponse>> {
    parse_tier(&tier)?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        services: ServiceStatus {
            opensource: OpensourceServices {
                pdf_processor: availability(
                    state.processor(Tier::Opensource, Domain::Pdf).is_some(),
                ),
                web_processor: availability(
                    state.processor(Tier::Opensource, Domain::Web).is_some(),
                ),
            },
            enterprise: EnterpriseServices {
                azure_di: availability(state.has_cloud(Tier::Enterprise, Domain::Pdf)),
                diffbot: availability(state.has_cloud(Tier::Enterprise, Domain::Web)),
            },
            storage: availability(state.has_store()),
        },
    }))
}
