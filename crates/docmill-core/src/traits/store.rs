//! Artifact Store Gateway trait.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Opaque object-storage sink for extracted byte payloads.
///
/// Keys are hierarchical strings, namespaced as
/// `{tier}/{domain}/{document_id}/{artifact}`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `data` under `key`, returning the key it was stored under.
    async fn upload(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String>;

    /// Fetch the bytes stored under `key`.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object under `key`. Failures are logged and reported as `false`.
    async fn delete(&self, key: &str) -> bool;

    /// Backend name for health reporting.
    fn name(&self) -> &str;
}
