//! Fallback coordinator shared by the PDF and Web domains.
//!
//! One policy object per processor, parameterized by an optional cloud engine
//! and a mandatory local engine. Selection is recomputed for every request and
//! touches no shared state.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::traits::ExtractionEngine;
use crate::types::{Domain, EngineChoice, Extraction, ExtractionRequest};

/// Result of running the policy for one request.
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub extraction: Extraction,
    /// Name of the engine that actually produced the extraction.
    pub engine: String,
    /// Class of the engine that actually produced the extraction.
    pub choice: EngineChoice,
    /// Set when the cloud engine failed and the local engine took over.
    pub fallback_reason: Option<String>,
}

/// Cloud-first, local-fallback engine pair.
#[derive(Clone)]
pub struct FallbackPolicy {
    cloud: Option<Arc<dyn ExtractionEngine>>,
    local: Arc<dyn ExtractionEngine>,
}

impl FallbackPolicy {
    /// Create a policy with an optional cloud engine.
    ///
    /// Both engines must serve the same domain.
    pub fn new(
        cloud: Option<Arc<dyn ExtractionEngine>>,
        local: Arc<dyn ExtractionEngine>,
    ) -> ExtractResult<Self> {
        if let Some(cloud) = &cloud {
            if cloud.domain() != local.domain() {
                return Err(ExtractError::Configuration(format!(
                    "{} engine '{}' cannot back up {} engine '{}'",
                    local.domain(),
                    local.name(),
                    cloud.domain(),
                    cloud.name()
                )));
            }
        }
        Ok(Self { cloud, local })
    }

    /// Create a policy that always runs the local engine.
    pub fn local_only(local: Arc<dyn ExtractionEngine>) -> Self {
        Self { cloud: None, local }
    }

    /// Domain served by this policy.
    pub fn domain(&self) -> Domain {
        self.local.domain()
    }

    /// Engine class the next request will start with.
    pub fn select(&self) -> EngineChoice {
        match &self.cloud {
            Some(cloud) => cloud.choice(),
            None => self.local.choice(),
        }
    }

    /// Whether a cloud engine is configured.
    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    /// Name of the local engine.
    pub fn local_name(&self) -> &str {
        self.local.name()
    }

    /// Name of the cloud engine, if configured.
    pub fn cloud_name(&self) -> Option<&str> {
        self.cloud.as_deref().map(|engine| engine.name())
    }

    /// Run the selected engine, substituting the local engine when the cloud
    /// engine fails with a recoverable error.
    pub async fn run(&self, request: &ExtractionRequest) -> ExtractResult<EngineRun> {
        let Some(cloud) = self.cloud.as_ref() else {
            return self.run_local(request, None).await;
        };

        match cloud.extract(request).await {
            Ok(extraction) => {
                debug!(engine = cloud.name(), "Cloud engine extraction succeeded");
                Ok(EngineRun {
                    extraction,
                    engine: cloud.name().to_string(),
                    choice: cloud.choice(),
                    fallback_reason: None,
                })
            }
            Err(err) if err.is_recoverable() => {
                warn!(
                    engine = cloud.name(),
                    fallback = self.local.name(),
                    error = %err,
                    "Cloud engine failed, falling back to local engine"
                );
                self.run_local(request, Some(err.to_string())).await
            }
            Err(err) => {
                error!(engine = cloud.name(), error = %err, "Cloud engine failed");
                Err(err)
            }
        }
    }

    async fn run_local(
        &self,
        request: &ExtractionRequest,
        fallback_reason: Option<String>,
    ) -> ExtractResult<EngineRun> {
        let extraction = self.local.extract(request).await.map_err(|err| {
            error!(engine = self.local.name(), error = %err, "Local engine failed");
            err
        })?;

        Ok(EngineRun {
            extraction,
            engine: self.local.name().to_string(),
            choice: self.local.choice(),
            fallback_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentContent;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Succeed(&'static str),
        Empty,
        Unauthorized,
        Malformed,
    }

    struct FakeEngine {
        name: &'static str,
        domain: Domain,
        choice: EngineChoice,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        fn new(name: &'static str, choice: EngineChoice, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                domain: Domain::Web,
                choice,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ExtractionEngine for FakeEngine {
        async fn extract(&self, _request: &ExtractionRequest) -> ExtractResult<Extraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(text) => Ok(Extraction::new(DocumentContent {
                    text: vec![text.to_string()],
                    ..Default::default()
                })),
                Behavior::Empty => Err(ExtractError::EmptyResult("no objects".into())),
                Behavior::Unauthorized => Err(ExtractError::from_http_status(401, "bad token")),
                Behavior::Malformed => Err(ExtractError::Parse("garbled".into())),
            }
        }

        fn domain(&self) -> Domain {
            self.domain
        }

        fn choice(&self) -> EngineChoice {
            self.choice
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn request() -> ExtractionRequest {
        ExtractionRequest::url("https://example.com").unwrap()
    }

    #[tokio::test]
    async fn test_no_cloud_uses_local() {
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::local_only(local.clone());

        assert_eq!(policy.select(), EngineChoice::Local);
        let run = policy.run(&request()).await.unwrap();
        assert_eq!(run.engine, "local");
        assert_eq!(run.choice, EngineChoice::Local);
        assert!(run.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn test_cloud_success_skips_local() {
        let cloud = FakeEngine::new("cloud", EngineChoice::Cloud, Behavior::Succeed("cloud text"));
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::new(Some(cloud.clone()), local.clone()).unwrap();

        assert_eq!(policy.select(), EngineChoice::Cloud);
        let run = policy.run(&request()).await.unwrap();
        assert_eq!(run.engine, "cloud");
        assert_eq!(run.extraction.content.text, vec!["cloud text"]);
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_cloud_result_falls_back() {
        let cloud = FakeEngine::new("cloud", EngineChoice::Cloud, Behavior::Empty);
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::new(Some(cloud.clone()), local.clone()).unwrap();

        let run = policy.run(&request()).await.unwrap();
        assert_eq!(run.engine, "local");
        assert_eq!(run.choice, EngineChoice::Local);
        assert!(run.fallback_reason.unwrap().contains("no objects"));
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 1);
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_falls_back() {
        let cloud = FakeEngine::new("cloud", EngineChoice::Cloud, Behavior::Unauthorized);
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::new(Some(cloud), local).unwrap();

        let run = policy.run(&request()).await.unwrap();
        assert_eq!(run.engine, "local");
    }

    #[tokio::test]
    async fn test_fatal_cloud_error_propagates() {
        let cloud = FakeEngine::new("cloud", EngineChoice::Cloud, Behavior::Malformed);
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::new(Some(cloud), local.clone()).unwrap();

        let result = policy.run(&request()).await;
        assert!(matches!(result, Err(ExtractError::Parse(_))));
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_selection_is_recomputed_per_request() {
        let cloud = FakeEngine::new("cloud", EngineChoice::Cloud, Behavior::Empty);
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));
        let policy = FallbackPolicy::new(Some(cloud.clone()), local).unwrap();

        policy.run(&request()).await.unwrap();
        policy.run(&request()).await.unwrap();
        // A failed cloud call does not demote the cloud engine for later requests.
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 2);
        assert_eq!(policy.select(), EngineChoice::Cloud);
    }

    #[test]
    fn test_engines_of_different_domains_rejected() {
        let cloud = Arc::new(FakeEngine {
            name: "cloud",
            domain: Domain::Pdf,
            choice: EngineChoice::Cloud,
            behavior: Behavior::Empty,
            calls: AtomicUsize::new(0),
        });
        let local = FakeEngine::new("local", EngineChoice::Local, Behavior::Succeed("local text"));

        let result = FallbackPolicy::new(Some(cloud), local);
        assert!(matches!(result, Err(ExtractError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_run_reports_engine_class() {
        // The engine's own class is reported, whichever slot it occupies.
        let local = FakeEngine::new("local", EngineChoice::Cloud, Behavior::Succeed("text"));
        let policy = FallbackPolicy::local_only(local);

        assert_eq!(policy.domain(), Domain::Web);
        let run = policy.run(&request()).await.unwrap();
        assert_eq!(run.choice, EngineChoice::Cloud);
    }
}
