//! In-memory artifact store.

use std::collections::HashMap;

use async_trait::async_trait;
use docmill_core::{ArtifactStore, StorageError, StorageResult};
use tokio::sync::RwLock;
use tracing::debug;

/// A stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Artifact store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Content type recorded for `key`.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn upload(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String> {
        debug!(key, bytes = data.len(), "Storing object in memory");
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> bool {
        self.objects.write().await.remove(key).is_some()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
