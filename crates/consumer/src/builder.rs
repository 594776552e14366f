use std::sync::Arc;

use seedbomb_provider::{CredentialProvider, DynActionDispatcher, MessageAcknowledger};
use seedbomb_state::DedupStore;
use thiserror::Error;

use crate::metrics::ConsumerMetrics;
use crate::processor::Orchestrator;
use crate::template::RequestTemplate;

/// A required collaborator was not supplied to the builder.
#[derive(Debug, Error)]
#[error("orchestrator misconfigured: {0} is required")]
pub struct BuildError(pub &'static str);

/// Fluent builder for an [`Orchestrator`].
///
/// The dedup store, credential provider, dispatcher and acknowledger are
/// required. The request template and metrics default.
#[derive(Default)]
pub struct OrchestratorBuilder {
    store: Option<Arc<dyn DedupStore>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    dispatcher: Option<Arc<dyn DynActionDispatcher>>,
    acknowledger: Option<Arc<dyn MessageAcknowledger>>,
    template: RequestTemplate,
    metrics: Option<Arc<ConsumerMetrics>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn DedupStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn DynActionDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    #[must_use]
    pub fn acknowledger(mut self, acknowledger: Arc<dyn MessageAcknowledger>) -> Self {
        self.acknowledger = Some(acknowledger);
        self
    }

    /// Set how message bodies become dispatch requests.
    #[must_use]
    pub fn template(mut self, template: RequestTemplate) -> Self {
        self.template = template;
        self
    }

    /// Share an existing metrics instance.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<ConsumerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Orchestrator, BuildError> {
        Ok(Orchestrator {
            store: self.store.ok_or(BuildError("dedup store"))?,
            credentials: self.credentials.ok_or(BuildError("credential provider"))?,
            dispatcher: self.dispatcher.ok_or(BuildError("dispatcher"))?,
            acknowledger: self.acknowledger.ok_or(BuildError("acknowledger"))?,
            template: self.template,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FlakyDedupStore, RecordingAcknowledger, ScriptedDispatcher, StaticCredentialProvider,
    };
    use seedbomb_core::DispatchResult;

    #[test]
    fn build_requires_store() {
        let err = OrchestratorBuilder::new()
            .credentials(Arc::new(StaticCredentialProvider::new("tok")))
            .dispatcher(Arc::new(ScriptedDispatcher::always(DispatchResult::Accepted)))
            .acknowledger(Arc::new(RecordingAcknowledger::new()))
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "orchestrator misconfigured: dedup store is required"
        );
    }

    #[test]
    fn build_shares_metrics() {
        let metrics = Arc::new(ConsumerMetrics::default());
        let orchestrator = OrchestratorBuilder::new()
            .store(Arc::new(FlakyDedupStore::new()))
            .credentials(Arc::new(StaticCredentialProvider::new("tok")))
            .dispatcher(Arc::new(ScriptedDispatcher::always(DispatchResult::Accepted)))
            .acknowledger(Arc::new(RecordingAcknowledger::new()))
            .metrics(Arc::clone(&metrics))
            .build()
            .unwrap();
        metrics.increment_received();
        assert_eq!(orchestrator.metrics().snapshot().received, 1);
    }
}
