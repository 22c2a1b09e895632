//! Configuration system for docmill.
//!
//! One [`AppConfig`] is built at process start and handed to each component.
//! Absent cloud credentials are not an error: the affected domain runs its
//! local engine.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{ExtractError, ExtractResult};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
    /// Upper bound for a whole processing request.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
            request_timeout_secs: 600,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Azure Document Intelligence settings for the cloud PDF engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub endpoint: Option<String>,
    pub key: Option<SecretString>,
    pub model: String,
    pub api_version: String,
    /// Bound on submit + polling of one analysis.
    pub analyze_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Submission retries on transient failures.
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            model: "prebuilt-document".to_string(),
            api_version: "2023-07-31".to_string(),
            analyze_timeout_secs: 300,
            poll_interval_ms: 1000,
            max_retries: 3,
            retry_delay_ms: 5000,
        }
    }
}

impl AzureConfig {
    /// Whether both endpoint and key are present.
    pub fn is_configured(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty()) && self.key.is_some()
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Diffbot Article API settings for the cloud web engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiffbotConfig {
    pub token: Option<SecretString>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for DiffbotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.diffbot.com/v3/article".to_string(),
            timeout_secs: 30,
        }
    }
}

impl DiffbotConfig {
    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for fetching pages with the local web engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebFetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Skip TLS certificate verification. Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
}

impl Default for WebFetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl WebFetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Artifact store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// No persistence.
    #[default]
    None,
    /// Process-local map.
    Memory,
    /// S3-compatible bucket.
    S3,
}

/// Artifact store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<SecretString>,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint_url: Option<String>,
    /// Budget for uploading one document's artifacts.
    pub upload_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::None,
            bucket: None,
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            upload_timeout_secs: 60,
        }
    }
}

impl StorageConfig {
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub azure: AzureConfig,
    pub diffbot: DiffbotConfig,
    pub web: WebFetchConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str());
        if !matches!(ext, Some("toml" | "json" | "yaml" | "yml")) {
            return Err(ExtractError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;
        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| ExtractError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ExtractError::Configuration(e.to_string())),
            _ => serde_yaml::from_str(&content)
                .map_err(|e| ExtractError::Configuration(e.to_string())),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        // Server
        if let Some(host) = get("DOCMILL_HOST") {
            config.server.host = host;
        }
        if let Some(port) = get("DOCMILL_PORT").and_then(|v| v.parse().ok()) {
            config.server.port = port;
        }
        if let Some(bytes) = get("DOCMILL_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            config.server.max_upload_bytes = bytes;
        }
        if let Some(secs) = get("DOCMILL_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.server.request_timeout_secs = secs;
        }

        // Azure Document Intelligence
        config.azure.endpoint =
            get("AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT").or_else(|| get("DI_ENDPOINT"));
        config.azure.key = get("AZURE_DOCUMENT_INTELLIGENCE_KEY")
            .or_else(|| get("DI_KEY"))
            .map(SecretString::new);
        if let Some(secs) = get("DOCMILL_ANALYZE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.azure.analyze_timeout_secs = secs;
        }
        if let Some(ms) = get("DOCMILL_ANALYZE_POLL_MS").and_then(|v| v.parse().ok()) {
            config.azure.poll_interval_ms = ms;
        }

        // Diffbot
        config.diffbot.token = get("DIFFBOT_TOKEN").map(SecretString::new);
        if let Some(api_url) = get("DIFFBOT_API_URL") {
            config.diffbot.api_url = api_url;
        }

        // Local web fetch
        if let Some(secs) = get("DOCMILL_WEB_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.web.timeout_secs = secs;
        }
        if let Some(agent) = get("DOCMILL_USER_AGENT") {
            config.web.user_agent = agent;
        }
        config.web.accept_invalid_certs = get("DOCMILL_WEB_ACCEPT_INVALID_CERTS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // Storage
        config.storage.bucket = get("AWS_BUCKET_NAME");
        if let Some(region) = get("AWS_REGION") {
            config.storage.region = region;
        }
        config.storage.access_key_id = get("AWS_ACCESS_KEY_ID");
        config.storage.secret_access_key = get("AWS_SECRET_ACCESS_KEY").map(SecretString::new);
        config.storage.endpoint_url = get("AWS_ENDPOINT_URL");
        if let Some(secs) = get("DOCMILL_STORAGE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.storage.upload_timeout_secs = secs;
        }
        config.storage.backend = match get("DOCMILL_STORAGE").map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "memory" => StorageBackend::Memory,
            Some(v) if v == "none" => StorageBackend::None,
            Some(v) if v == "s3" => StorageBackend::S3,
            _ if config.storage.bucket.is_some() => StorageBackend::S3,
            _ => StorageBackend::None,
        };

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_credentials() {
        let config = AppConfig::from_lookup(lookup(&[]));

        assert!(!config.azure.is_configured());
        assert!(!config.diffbot.is_configured());
        assert_eq!(config.storage.backend, StorageBackend::None);
        assert_eq!(config.azure.analyze_timeout_secs, 300);
        assert_eq!(config.web.timeout_secs, 30);
        assert!(!config.web.accept_invalid_certs);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_cloud_credentials_and_aliases() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DI_ENDPOINT", "https://example.cognitiveservices.azure.com"),
            ("DI_KEY", "secret-key"),
            ("DIFFBOT_TOKEN", "token-123"),
        ]));

        assert!(config.azure.is_configured());
        assert_eq!(
            config.azure.key.as_ref().unwrap().expose_secret(),
            "secret-key"
        );
        assert!(config.diffbot.is_configured());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = AppConfig::from_lookup(lookup(&[
            ("AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT", "  "),
            ("AZURE_DOCUMENT_INTELLIGENCE_KEY", "k"),
        ]));
        assert!(!config.azure.is_configured());
    }

    #[test]
    fn test_storage_backend_selection() {
        let s3 = AppConfig::from_lookup(lookup(&[("AWS_BUCKET_NAME", "docs")]));
        assert_eq!(s3.storage.backend, StorageBackend::S3);
        assert_eq!(s3.storage.region, "us-east-1");

        let memory = AppConfig::from_lookup(lookup(&[
            ("AWS_BUCKET_NAME", "docs"),
            ("DOCMILL_STORAGE", "memory"),
        ]));
        assert_eq!(memory.storage.backend, StorageBackend::Memory);
        assert_eq!(memory.storage.upload_timeout(), Duration::from_secs(60));

        let tuned = AppConfig::from_lookup(lookup(&[("DOCMILL_STORAGE_TIMEOUT_SECS", "5")]));
        assert_eq!(tuned.storage.upload_timeout_secs, 5);
    }

    #[test]
    fn test_tls_opt_out_is_explicit() {
        let config =
            AppConfig::from_lookup(lookup(&[("DOCMILL_WEB_ACCEPT_INVALID_CERTS", "true")]));
        assert!(config.web.accept_invalid_certs);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmill.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9001\n\n[web]\ntimeout_secs = 10\n\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.web.timeout_secs, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.azure.model, "prebuilt-document");
    }

    #[test]
    fn test_unsupported_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmill.ini");
        std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let result = AppConfig::from_file(&path);
        assert!(matches!(result, Err(ExtractError::Configuration(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
