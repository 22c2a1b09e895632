//! Route definitions for the REST API.

mod health;
mod process;

use axum::{
    routing::{get, post},
    Router,
};
use docmill_core::Tier;

use crate::error::ApiError;
use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        // Per-tier pipelines
        .route("/api/v1/:tier/process-pdf", post(process::process_pdf))
        .route("/api/v1/:tier/process-webpage", post(process::process_webpage))
        // Health check
        .route("/api/v1/:tier/health", get(health::health_check))
        // Attach state
        .with_state(state)
}

/// Parse the tier path segment; unknown tiers are not routes.
fn parse_tier(raw: &str) -> Result<Tier, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Unknown tier '{}'", raw)))
}

pub use health::*;
pub use process::*;
