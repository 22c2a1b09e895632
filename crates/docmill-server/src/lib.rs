//! docmill-server - REST API server for docmill.
//!
//! Exposes the PDF and web page pipelines of both tiers over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use docmill_core::AppConfig;
//! use docmill_server::{create_server, create_state};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::from_env();
//!     let state = create_state(&config).await.unwrap();
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::create_state;
pub use state::AppState;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes();
    routes::create_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
