//! Factory for building the server state from configuration.

use docmill_core::{AppConfig, ExtractError, ExtractResult, FallbackPolicy, Processor, Tier};
use docmill_extractors::EngineFactory;
use docmill_storage::StoreFactory;
use strum::IntoEnumIterator;
use tracing::info;

use crate::state::AppState;

/// Create the application state: one processor per tier and domain, sharing
/// the configured artifact store.
pub async fn create_state(config: &AppConfig) -> ExtractResult<AppState> {
    let store = StoreFactory::create(&config.storage)
        .await
        .map_err(|e| ExtractError::Configuration(e.to_string()))?;
    let timeout = config.server.request_timeout();

    let mut processors = Vec::with_capacity(4);
    for tier in Tier::iter() {
        let policies: [FallbackPolicy; 2] = [
            EngineFactory::pdf_policy(tier, config)?,
            EngineFactory::web_policy(tier, config)?,
        ];
        for policy in policies {
            processors.push(
                Processor::new(tier, policy, store.clone(), timeout)
                    .with_persist_timeout(config.storage.upload_timeout()),
            );
        }
    }

    info!(
        processors = processors.len(),
        storage = store.as_ref().map(|s| s.name()).unwrap_or("none"),
        "Processors ready"
    );
    Ok(AppState::new(processors, store, config.server.max_upload_bytes))
}
