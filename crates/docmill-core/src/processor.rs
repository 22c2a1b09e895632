//! Tier-and-domain processor.
//!
//! A [`Processor`] owns one [`FallbackPolicy`] and an optional artifact store.
//! It runs the policy, stamps the document id and metadata, persists the
//! artifacts, and assembles the immutable [`DocumentRecord`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::error::{ExtractError, ExtractResult};
use crate::fallback::{EngineRun, FallbackPolicy};
use crate::normalize::document_id;
use crate::persist::persist_artifacts;
use crate::traits::ArtifactStore;
use crate::types::{
    Domain, DocumentRecord, EngineChoice, ExtractionRequest, RecordMetadata, Tier,
};

const RESERVED_METADATA_KEYS: &[&str] = &[
    "processor",
    "timestamp",
    "page_count",
    "fallback_reason",
    "storage_paths",
];

/// Engine tag embedded in document ids.
pub fn engine_tag(tier: Tier, domain: Domain, choice: EngineChoice) -> &'static str {
    match (tier, domain, choice) {
        (Tier::Opensource, _, _) => "os",
        (Tier::Enterprise, Domain::Pdf, EngineChoice::Cloud) => "azure",
        (Tier::Enterprise, Domain::Pdf, EngineChoice::Local) => "fallback",
        (Tier::Enterprise, Domain::Web, _) => "enterprise",
    }
}

/// Processes requests of one domain for one tier.
#[derive(Clone)]
pub struct Processor {
    tier: Tier,
    domain: Domain,
    policy: FallbackPolicy,
    store: Option<Arc<dyn ArtifactStore>>,
    request_timeout: Duration,
    persist_timeout: Duration,
}

impl Processor {
    /// Create a processor for the domain served by `policy`.
    ///
    /// Artifact uploads get the same budget as extraction until
    /// [`Processor::with_persist_timeout`] says otherwise.
    pub fn new(
        tier: Tier,
        policy: FallbackPolicy,
        store: Option<Arc<dyn ArtifactStore>>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            tier,
            domain: policy.domain(),
            policy,
            store,
            request_timeout,
            persist_timeout: request_timeout,
        }
    }

    /// Bound the artifact upload step separately from extraction.
    pub fn with_persist_timeout(mut self, persist_timeout: Duration) -> Self {
        self.persist_timeout = persist_timeout;
        self
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Whether a cloud engine is configured for this processor.
    pub fn has_cloud(&self) -> bool {
        self.policy.has_cloud()
    }

    /// Run one request end to end.
    ///
    /// Extraction is bounded by the request timeout and artifact uploads by
    /// the persist timeout. A slow or failing store never fails the request.
    #[instrument(skip(self, request), fields(tier = %self.tier, domain = %self.domain))]
    pub async fn process(&self, request: ExtractionRequest) -> ExtractResult<DocumentRecord> {
        if request.domain() != self.domain {
            return Err(ExtractError::InvalidInput(format!(
                "{} processor cannot handle a {} request",
                self.domain,
                request.domain()
            )));
        }

        let EngineRun {
            extraction,
            engine,
            choice,
            fallback_reason,
        } = match tokio::time::timeout(self.request_timeout, self.policy.run(&request)).await {
            Ok(run) => run?,
            Err(_) => {
                return Err(ExtractError::timeout(
                    format!("{} {} processing", self.tier, self.domain),
                    self.request_timeout,
                ));
            }
        };

        let now = Utc::now();
        let tag = engine_tag(self.tier, self.domain, choice);
        let id = document_id(self.domain, tag, request.identity_bytes(), now);
        debug!(document_id = %id, engine = %engine, "Extraction complete");

        // Engine metadata must not shadow the record-level fields.
        let mut extra = extraction.metadata;
        for reserved in RESERVED_METADATA_KEYS {
            extra.remove(*reserved);
        }

        let mut metadata = RecordMetadata {
            processor: engine,
            timestamp: now.to_rfc3339(),
            page_count: extraction.page_count,
            fallback_reason,
            storage_paths: Default::default(),
            extra,
        };

        if let Some(store) = self.store.as_deref() {
            let prefix = format!("{}/{}/{}", self.tier, self.domain, id);
            let upload = persist_artifacts(store, &prefix, &extraction.content, &metadata);
            let uploaded = tokio::time::timeout(self.persist_timeout, upload).await;
            metadata.storage_paths = match uploaded {
                Ok(paths) => paths,
                Err(_) => {
                    error!(
                        document_id = %id,
                        store = store.name(),
                        timeout_ms = self.persist_timeout.as_millis() as u64,
                        "Artifact persistence timed out"
                    );
                    Default::default()
                }
            };
        }

        info!(
            document_id = %id,
            processor = %metadata.processor,
            stored = metadata.storage_paths.len(),
            "Document processed"
        );

        Ok(DocumentRecord {
            document_id: id,
            timestamp: now,
            content: extraction.content,
            metadata,
        })
    }
}
