//! S3-compatible artifact store.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use docmill_core::{ArtifactStore, StorageConfig, StorageError, StorageResult};
use secrecy::ExposeSecret;
use tracing::{debug, error, info};

/// Artifact store backed by an S3 bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from configuration.
    ///
    /// Explicit credentials take precedence over the default provider chain.
    /// A custom endpoint switches to path-style addressing.
    pub async fn new(config: &StorageConfig) -> StorageResult<Self> {
        let bucket = config
            .bucket
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| {
                StorageError::Configuration(
                    "S3 bucket required. Set AWS_BUCKET_NAME.".to_string(),
                )
            })?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key.expose_secret(),
                None,
                None,
                "docmill",
            ));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        info!(bucket = %bucket, region = %config.region, "S3 artifact store ready");
        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket,
        })
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn upload(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String> {
        let bytes = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::backend("upload", key, e.to_string()))?;

        debug!(key, bytes, "Uploaded object");
        Ok(key.to_string())
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::backend("download", key, service_error.to_string())
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend("download", key, e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> bool {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(key, error = %e, "Error deleting object");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "s3"
    }
}
