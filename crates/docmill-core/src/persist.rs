//! Piecewise persistence of a document's artifacts.
//!
//! Persistence never fails a request: any upload error degrades the whole
//! result to an empty storage-path mapping.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::{debug, error};

use crate::normalize::{image_content_type, table_to_csv};
use crate::traits::ArtifactStore;
use crate::types::{DocumentContent, RecordMetadata};

/// One object to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Logical name used as the `storage_paths` key.
    pub name: String,
    /// File name below the document prefix.
    pub file: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Lay out the artifacts for a document.
///
/// Text is joined with a blank line, each table becomes a CSV object, the
/// metadata becomes JSON, raw markup is kept when present, and embedded
/// images are stored individually. Remote images are not downloaded.
pub fn collect_artifacts(
    content: &DocumentContent,
    metadata: &RecordMetadata,
) -> serde_json::Result<Vec<Artifact>> {
    let mut artifacts = vec![Artifact {
        name: "text".to_string(),
        file: "text_content.txt".to_string(),
        content_type: "text/plain",
        data: content.joined_text().into_bytes(),
    }];

    for (idx, table) in content.tables.iter().enumerate() {
        artifacts.push(Artifact {
            name: format!("table_{}", idx + 1),
            file: format!("table_{}.csv", idx + 1),
            content_type: "text/csv",
            data: table_to_csv(table).into_bytes(),
        });
    }

    artifacts.push(Artifact {
        name: "metadata".to_string(),
        file: "metadata.json".to_string(),
        content_type: "application/json",
        data: serde_json::to_vec(metadata)?,
    });

    if let Some(html) = content.html.as_ref().filter(|h| !h.is_empty()) {
        artifacts.push(Artifact {
            name: "html".to_string(),
            file: "content.html".to_string(),
            content_type: "text/html",
            data: html.clone().into_bytes(),
        });
    }

    let embedded = content.images.iter().filter_map(|i| i.as_embedded());
    for (idx, image) in embedded.enumerate() {
        artifacts.push(Artifact {
            name: format!("image_{}", idx),
            file: format!("images/image_{}.{}", idx, image.ext),
            content_type: image_content_type(&image.ext),
            data: image.data.clone(),
        });
    }

    Ok(artifacts)
}

/// Upload every artifact below `prefix` and return the storage paths.
///
/// Uploads are independent (distinct keys) and run concurrently.
pub async fn persist_artifacts(
    store: &dyn ArtifactStore,
    prefix: &str,
    content: &DocumentContent,
    metadata: &RecordMetadata,
) -> BTreeMap<String, String> {
    let artifacts = match collect_artifacts(content, metadata) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!(prefix, error = %e, "Failed to serialize artifacts");
            return BTreeMap::new();
        }
    };

    let uploads = artifacts.into_iter().map(|artifact| async move {
        let key = format!("{}/{}", prefix, artifact.file);
        store
            .upload(artifact.data, &key, artifact.content_type)
            .await
            .map(|stored| (artifact.name, stored))
    });

    match try_join_all(uploads).await {
        Ok(paths) => {
            debug!(prefix, count = paths.len(), store = store.name(), "Stored artifacts");
            paths.into_iter().collect()
        }
        Err(e) => {
            error!(prefix, store = store.name(), error = %e, "Error storing content");
            BTreeMap::new()
        }
    }
}
