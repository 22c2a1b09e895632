//! Error types for docmill operations.
//!
//! Extraction errors carry enough structure for two decisions made far from
//! where they are raised: whether the fallback coordinator may substitute the
//! local engine ([`ExtractError::is_recoverable`]), and which status class the
//! request surface reports ([`ExtractError::kind`]).

use std::time::Duration;
use thiserror::Error;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type alias for artifact store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Main error type for extraction pipelines.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The request itself is unusable (wrong domain, bad URL, empty upload).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The PDF could not be opened or its text could not be read.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The local web fetch returned a non-200 status.
    #[error("HTTP Error {status} fetching {url}")]
    Fetch { url: String, status: u16 },

    /// Transport-level failure talking to a remote service.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cloud service rejected the configured credentials.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Cloud service throttled the request.
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Cloud service answered with a non-success status.
    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Cloud service succeeded but produced nothing usable.
    #[error("Engine returned no content: {0}")]
    EmptyResult(String),

    /// The cloud analysis operation finished in a failed state.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// An operation exceeded its configured bound.
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: String,
        after: Duration,
    },

    /// A response or document could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Coarse classification used when shaping caller-facing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something we cannot process.
    BadInput,
    /// A remote dependency failed.
    Upstream,
    /// A configured time bound was exceeded.
    Timeout,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Get the string representation of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadInput => "BAD_INPUT",
            ErrorKind::Upstream => "UPSTREAM_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl ExtractError {
    /// Create a network error from any transport error.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Convert from an HTTP status code returned by a cloud service.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Authentication(format!("HTTP {}: {}", status, body)),
            429 => Self::RateLimit(format!("HTTP {}: {}", status, body)),
            _ => Self::Upstream {
                status,
                message: body.to_string(),
            },
        }
    }

    /// Whether a cloud engine failing with this error may be replaced by the
    /// local engine within the same request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Authentication(_)
                | Self::RateLimit(_)
                | Self::Upstream { .. }
                | Self::EmptyResult(_)
        )
    }

    /// Whether retrying the same call against the same service may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimit(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Status classification for the request surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Pdf(_) => ErrorKind::BadInput,
            Self::Fetch { .. }
            | Self::Network { .. }
            | Self::Authentication(_)
            | Self::RateLimit(_)
            | Self::Upstream { .. }
            | Self::EmptyResult(_)
            | Self::Analysis(_) => ErrorKind::Upstream,
            Self::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Internal,
        }
    }
}

/// Errors raised by an artifact store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No object stored under the key.
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// Backend rejected or failed the operation.
    #[error("Storage backend error during {operation} of '{key}': {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// Store could not be constructed from configuration.
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a backend error.
    pub fn backend(
        operation: &'static str,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            operation,
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_classification() {
        assert!(matches!(
            ExtractError::from_http_status(401, "denied"),
            ExtractError::Authentication(_)
        ));
        assert!(matches!(
            ExtractError::from_http_status(403, "denied"),
            ExtractError::Authentication(_)
        ));
        assert!(matches!(
            ExtractError::from_http_status(429, "slow down"),
            ExtractError::RateLimit(_)
        ));
        assert!(matches!(
            ExtractError::from_http_status(503, "busy"),
            ExtractError::Upstream { status: 503, .. }
        ));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(ExtractError::EmptyResult("no objects".into()).is_recoverable());
        assert!(ExtractError::from_http_status(401, "").is_recoverable());
        assert!(ExtractError::from_http_status(500, "").is_recoverable());

        assert!(!ExtractError::timeout("analysis", Duration::from_secs(300)).is_recoverable());
        assert!(!ExtractError::Pdf("broken xref".into()).is_recoverable());
        assert!(!ExtractError::Fetch {
            url: "https://example.com".into(),
            status: 404
        }
        .is_recoverable());
    }

    #[test]
    fn test_transient_errors() {
        assert!(ExtractError::from_http_status(502, "").is_transient());
        assert!(ExtractError::from_http_status(429, "").is_transient());
        assert!(!ExtractError::from_http_status(400, "").is_transient());
        assert!(!ExtractError::from_http_status(401, "").is_transient());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ExtractError::Pdf("x".into()).kind(), ErrorKind::BadInput);
        assert_eq!(
            ExtractError::Fetch {
                url: "u".into(),
                status: 404
            }
            .kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            ExtractError::timeout("fetch", Duration::from_secs(1)).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(ExtractError::Parse("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(ErrorKind::Upstream.as_str(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_timeout_display() {
        let err = ExtractError::timeout("Document analysis", Duration::from_secs(300));
        assert_eq!(err.to_string(), "Document analysis timed out after 300s");
    }
}
