//! Server state management.

use std::collections::HashMap;
use std::sync::Arc;

use docmill_core::{ArtifactStore, Domain, Processor, Tier};

/// Shared application state.
///
/// Processors are built once at startup and are read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub processors: HashMap<(Tier, Domain), Processor>,
    pub store: Option<Arc<dyn ArtifactStore>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        processors: Vec<Processor>,
        store: Option<Arc<dyn ArtifactStore>>,
        max_upload_bytes: usize,
    ) -> Self {
        let processors = processors
            .into_iter()
            .map(|p| ((p.tier(), p.domain()), p))
            .collect();

        Self {
            inner: Arc::new(AppStateInner {
                processors,
                store,
                max_upload_bytes,
            }),
        }
    }

    /// Processor for a tier and domain.
    pub fn processor(&self, tier: Tier, domain: Domain) -> Option<&Processor> {
        self.inner.processors.get(&(tier, domain))
    }

    /// Whether the cloud engine for a tier and domain is configured.
    pub fn has_cloud(&self, tier: Tier, domain: Domain) -> bool {
        self.processor(tier, domain).is_some_and(Processor::has_cloud)
    }

    /// Whether artifacts are persisted.
    pub fn has_store(&self) -> bool {
        self.inner.store.is_some()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}
