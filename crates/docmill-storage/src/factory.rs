//! Factory for creating artifact stores.

use std::sync::Arc;

use docmill_core::{ArtifactStore, StorageBackend, StorageConfig, StorageResult};
use tracing::info;

use crate::MemoryStore;

/// Factory for creating artifact stores.
pub struct StoreFactory;

impl StoreFactory {
    /// Create the configured store, or `None` when persistence is disabled.
    pub async fn create(config: &StorageConfig) -> StorageResult<Option<Arc<dyn ArtifactStore>>> {
        match config.backend {
            StorageBackend::None => {
                info!("Artifact storage disabled");
                Ok(None)
            }
            StorageBackend::Memory => Ok(Some(Arc::new(MemoryStore::new()))),
            #[cfg(feature = "s3")]
            StorageBackend::S3 => {
                let store = crate::S3Store::new(config).await?;
                Ok(Some(Arc::new(store)))
            }
            #[cfg(not(feature = "s3"))]
            StorageBackend::S3 => Err(docmill_core::StorageError::Configuration(
                "S3 storage requires the 's3' feature".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmill_core::StorageError;

    #[tokio::test]
    async fn test_disabled_storage() {
        let store = StoreFactory::create(&StorageConfig::default()).await.unwrap();
        assert!(store.is_none());
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let store = StoreFactory::create(&config).await.unwrap().unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_s3_without_bucket_fails() {
        let config = StorageConfig {
            backend: StorageBackend::S3,
            ..Default::default()
        };
        let result = StoreFactory::create(&config).await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }
}
