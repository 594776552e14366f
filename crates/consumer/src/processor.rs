use std::sync::Arc;

use seedbomb_core::{DispatchResult, InboundMessage, MessageId, ProcessedRecord};
use seedbomb_provider::{CredentialProvider, DynActionDispatcher, MessageAcknowledger};
use seedbomb_state::DedupStore;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ProcessingError, ProcessingFailure};
use crate::metrics::ConsumerMetrics;
use crate::state::ProcessingState;
use crate::template::RequestTemplate;

/// How a message reached [`ProcessingState::Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOutcome {
    /// Dispatched, recorded and acknowledged.
    Processed,
    /// A record already existed; acknowledged without dispatch.
    AlreadyProcessed,
}

/// Result of a message that reached [`ProcessingState::Done`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingReport {
    pub message_id: MessageId,
    pub outcome: ProcessingOutcome,
    /// Every state visited, ending with [`ProcessingState::Done`].
    pub path: Vec<ProcessingState>,
    /// The record write found an existing record from a concurrent delivery.
    pub record_was_present: bool,
}

/// State path of one processing attempt.
struct Run {
    path: Vec<ProcessingState>,
    record_was_present: bool,
}

impl Run {
    fn new() -> Self {
        Self {
            path: vec![ProcessingState::Received],
            record_was_present: false,
        }
    }

    fn enter(&mut self, state: ProcessingState) {
        debug!(state = %state, "state transition");
        self.path.push(state);
    }

    fn current(&self) -> ProcessingState {
        self.path
            .last()
            .copied()
            .unwrap_or(ProcessingState::Received)
    }
}

/// Drives queue messages through the idempotent processing state machine.
///
/// Collaborators are injected as trait objects. The orchestrator holds no
/// per-message state, so one instance is shared by every concurrent worker.
pub struct Orchestrator {
    pub(crate) store: Arc<dyn DedupStore>,
    pub(crate) credentials: Arc<dyn CredentialProvider>,
    pub(crate) dispatcher: Arc<dyn DynActionDispatcher>,
    pub(crate) acknowledger: Arc<dyn MessageAcknowledger>,
    pub(crate) template: RequestTemplate,
    pub(crate) metrics: Arc<ConsumerMetrics>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("dispatcher", &self.dispatcher.name())
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Shared metrics counters.
    pub fn metrics(&self) -> &Arc<ConsumerMetrics> {
        &self.metrics
    }

    /// Process a single delivery to a terminal state.
    ///
    /// On `Ok` the message has been acknowledged. On `Err` it has not, and the
    /// queue will redeliver it once its visibility timeout lapses.
    #[instrument(
        name = "consumer.process",
        skip(self, message),
        fields(message_id = %message.id, receive_count = ?message.receive_count())
    )]
    pub async fn process(
        &self,
        message: &InboundMessage,
    ) -> Result<ProcessingReport, ProcessingFailure> {
        self.metrics.increment_received();
        let mut run = Run::new();

        match self.drive(message, &mut run).await {
            Ok(outcome) => {
                run.enter(ProcessingState::Done);
                match outcome {
                    ProcessingOutcome::Processed => self.metrics.increment_processed(),
                    ProcessingOutcome::AlreadyProcessed => {
                        self.metrics.increment_already_processed();
                    }
                }
                info!(outcome = ?outcome, "message processed");
                Ok(ProcessingReport {
                    message_id: message.id.clone(),
                    outcome,
                    path: run.path,
                    record_was_present: run.record_was_present,
                })
            }
            Err(err) => {
                let state = run.current();
                run.enter(ProcessingState::Failed);
                self.metrics.increment_failed();
                match &err {
                    ProcessingError::DispatchRejected { .. } => {
                        self.metrics.increment_dispatch_rejected();
                    }
                    ProcessingError::TransportFailure(_) => {
                        self.metrics.increment_transport_failures();
                    }
                    _ => {}
                }
                error!(
                    state = %state,
                    kind = err.kind(),
                    error = %err,
                    "message processing failed; leaving message on queue"
                );
                Err(ProcessingFailure {
                    message_id: message.id.clone(),
                    state,
                    error: err,
                    path: run.path,
                })
            }
        }
    }

    async fn drive(
        &self,
        message: &InboundMessage,
        run: &mut Run,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        run.enter(ProcessingState::Deduplicating);
        if self.store.exists(&message.id).await? {
            run.enter(ProcessingState::AlreadyProcessed);
            info!("message already processed; acknowledging without dispatch");
            run.enter(ProcessingState::Acknowledging);
            self.acknowledger.acknowledge(&message.ack_token).await?;
            return Ok(ProcessingOutcome::AlreadyProcessed);
        }

        run.enter(ProcessingState::FetchingCredential);
        let request = self.template.render(&message.body)?;
        let credential = self.credentials.fetch().await?;

        run.enter(ProcessingState::Dispatching);
        let result = self.dispatcher.dispatch(&request, &credential).await;
        drop(credential);
        match result {
            DispatchResult::Accepted => run.enter(ProcessingState::Dispatched),
            DispatchResult::Rejected { status, body } => {
                run.enter(ProcessingState::DispatchFailed);
                return Err(ProcessingError::DispatchRejected { status, body });
            }
            DispatchResult::TransportFailure { cause } => {
                run.enter(ProcessingState::DispatchFailed);
                return Err(ProcessingError::TransportFailure(cause));
            }
        }

        run.enter(ProcessingState::Recording);
        let record = ProcessedRecord::now(message.id.clone());
        if !self.store.record(&record).await? {
            warn!("processed record already present; a concurrent delivery also dispatched");
            run.record_was_present = true;
        }

        run.enter(ProcessingState::Acknowledging);
        self.acknowledger.acknowledge(&message.ack_token).await?;
        Ok(ProcessingOutcome::Processed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use seedbomb_core::{DispatchResult, InboundMessage, MessageId, ProcessedRecord};
    use seedbomb_state::DedupStore;

    use super::*;
    use crate::builder::OrchestratorBuilder;
    use crate::testing::{
        FlakyDedupStore, RecordingAcknowledger, ScriptedDispatcher, StaticCredentialProvider,
    };

    use crate::state::ProcessingState::{
        Acknowledging, AlreadyProcessed, Deduplicating, DispatchFailed, Dispatched, Dispatching,
        Done, Failed, FetchingCredential, Received, Recording,
    };

    struct Harness {
        store: Arc<FlakyDedupStore>,
        credentials: Arc<StaticCredentialProvider>,
        dispatcher: Arc<ScriptedDispatcher>,
        acknowledger: Arc<RecordingAcknowledger>,
        orchestrator: Orchestrator,
    }

    fn harness(dispatch_result: DispatchResult) -> Harness {
        let store = Arc::new(FlakyDedupStore::new());
        let credentials = Arc::new(StaticCredentialProvider::new("tok"));
        let dispatcher = Arc::new(ScriptedDispatcher::always(dispatch_result));
        let acknowledger = Arc::new(RecordingAcknowledger::new());
        let orchestrator = OrchestratorBuilder::new()
            .store(store.clone())
            .credentials(credentials.clone())
            .dispatcher(dispatcher.clone())
            .acknowledger(acknowledger.clone())
            .build()
            .unwrap();
        Harness {
            store,
            credentials,
            dispatcher,
            acknowledger,
            orchestrator,
        }
    }

    fn message(id: &str) -> InboundMessage {
        InboundMessage::new(id, "ferrathorn-customer-010", format!("rh-{id}"))
    }

    #[tokio::test]
    async fn new_message_is_dispatched_recorded_and_acked() {
        let h = harness(DispatchResult::Accepted);

        let report = h.orchestrator.process(&message("m1")).await.unwrap();

        assert_eq!(report.outcome, ProcessingOutcome::Processed);
        assert_eq!(
            report.path,
            vec![
                Received,
                Deduplicating,
                FetchingCredential,
                Dispatching,
                Dispatched,
                Recording,
                Acknowledging,
                Done
            ]
        );
        assert!(!report.record_was_present);
        assert!(h.store.exists(&MessageId::new("m1")).await.unwrap());
        assert_eq!(h.acknowledger.acked(), vec!["rh-m1".to_owned()]);

        let calls = h.dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].token, "tok");
        assert_eq!(
            calls[0].request.inputs["customer_name"],
            "ferrathorn-customer-010"
        );

        let snap = h.orchestrator.metrics().snapshot();
        assert_eq!(snap.received, 1);
        assert_eq!(snap.processed, 1);
        assert_eq!(snap.failed, 0);
    }

    #[tokio::test]
    async fn already_processed_message_is_acked_without_side_effects() {
        let h = harness(DispatchResult::Accepted);
        h.store
            .record(&ProcessedRecord::now(MessageId::new("m2")))
            .await
            .unwrap();

        let report = h.orchestrator.process(&message("m2")).await.unwrap();

        assert_eq!(report.outcome, ProcessingOutcome::AlreadyProcessed);
        assert_eq!(
            report.path,
            vec![Received, Deduplicating, AlreadyProcessed, Acknowledging, Done]
        );
        assert_eq!(h.credentials.fetch_count(), 0);
        assert!(h.dispatcher.calls().is_empty());
        assert_eq!(h.acknowledger.acked(), vec!["rh-m2".to_owned()]);
        assert_eq!(h.orchestrator.metrics().snapshot().already_processed, 1);
    }

    #[tokio::test]
    async fn rejected_dispatch_is_not_recorded_or_acked() {
        let h = harness(DispatchResult::Rejected {
            status: 422,
            body: "Unprocessable".into(),
        });

        let failure = h.orchestrator.process(&message("m3")).await.unwrap_err();

        assert_eq!(failure.state, DispatchFailed);
        assert!(matches!(
            failure.error,
            ProcessingError::DispatchRejected { status: 422, .. }
        ));
        assert_eq!(failure.path.last(), Some(&Failed));
        assert!(!h.store.exists(&MessageId::new("m3")).await.unwrap());
        assert!(h.acknowledger.acked().is_empty());

        let snap = h.orchestrator.metrics().snapshot();
        assert_eq!(snap.dispatch_rejected, 1);
        assert_eq!(snap.failed, 1);
    }

    #[tokio::test]
    async fn record_failure_leaves_message_unacked() {
        let h = harness(DispatchResult::Accepted);
        h.store.fail_records(true);

        let failure = h.orchestrator.process(&message("m4")).await.unwrap_err();

        assert_eq!(failure.state, Recording);
        assert!(matches!(failure.error, ProcessingError::StoreUnavailable(_)));
        assert_eq!(h.dispatcher.calls().len(), 1);
        assert!(h.acknowledger.acked().is_empty());
        h.store.fail_records(false);
        assert!(!h.store.exists(&MessageId::new("m4")).await.unwrap());
    }

    #[tokio::test]
    async fn store_unavailable_on_dedup_fails_before_any_side_effect() {
        let h = harness(DispatchResult::Accepted);
        h.store.fail_exists(true);

        let failure = h.orchestrator.process(&message("m5")).await.unwrap_err();

        assert_eq!(failure.state, Deduplicating);
        assert!(matches!(failure.error, ProcessingError::StoreUnavailable(_)));
        assert_eq!(h.credentials.fetch_count(), 0);
        assert!(h.dispatcher.calls().is_empty());
        assert!(h.acknowledger.acked().is_empty());
    }

    #[tokio::test]
    async fn credential_failure_skips_dispatch() {
        let h = harness(DispatchResult::Accepted);
        h.credentials.fail(true);

        let failure = h.orchestrator.process(&message("m6")).await.unwrap_err();

        assert_eq!(failure.state, FetchingCredential);
        assert!(matches!(
            failure.error,
            ProcessingError::CredentialUnavailable(_)
        ));
        assert!(h.dispatcher.calls().is_empty());
        assert!(h.acknowledger.acked().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_classified() {
        let h = harness(DispatchResult::TransportFailure {
            cause: "connection reset".into(),
        });

        let failure = h.orchestrator.process(&message("m7")).await.unwrap_err();

        assert_eq!(failure.state, DispatchFailed);
        assert!(matches!(failure.error, ProcessingError::TransportFailure(_)));
        assert!(!h.store.exists(&MessageId::new("m7")).await.unwrap());
        assert_eq!(h.orchestrator.metrics().snapshot().transport_failures, 1);
    }

    #[tokio::test]
    async fn invalid_body_fails_without_credential_fetch() {
        let h = harness(DispatchResult::Accepted);
        let msg = InboundMessage::new("m8", "   ", "rh-m8");

        let failure = h.orchestrator.process(&msg).await.unwrap_err();

        assert!(matches!(failure.error, ProcessingError::InvalidMessage(_)));
        assert_eq!(h.credentials.fetch_count(), 0);
        assert!(h.dispatcher.calls().is_empty());
        assert!(h.acknowledger.acked().is_empty());
    }

    #[tokio::test]
    async fn ack_failure_then_redelivery_short_circuits() {
        let h = harness(DispatchResult::Accepted);
        h.acknowledger.fail_next(1);

        let failure = h.orchestrator.process(&message("m9")).await.unwrap_err();
        assert_eq!(failure.state, Acknowledging);
        assert!(matches!(failure.error, ProcessingError::AckFailed(_)));
        assert!(h.store.exists(&MessageId::new("m9")).await.unwrap());

        let report = h.orchestrator.process(&message("m9")).await.unwrap();
        assert_eq!(report.outcome, ProcessingOutcome::AlreadyProcessed);
        assert_eq!(h.dispatcher.calls().len(), 1);
        assert_eq!(h.acknowledger.acked(), vec!["rh-m9".to_owned()]);
    }

    #[tokio::test]
    async fn redelivery_after_rejection_dispatches_again() {
        let h = harness(DispatchResult::Accepted);
        h.dispatcher.push(DispatchResult::Rejected {
            status: 500,
            body: String::new(),
        });

        assert!(h.orchestrator.process(&message("m10")).await.is_err());
        let report = h.orchestrator.process(&message("m10")).await.unwrap();

        assert_eq!(report.outcome, ProcessingOutcome::Processed);
        assert_eq!(h.dispatcher.calls().len(), 2);
        assert_eq!(h.acknowledger.acked().len(), 1);
    }

    #[tokio::test]
    async fn processing_twice_yields_one_dispatch_and_one_record() {
        let h = harness(DispatchResult::Accepted);

        h.orchestrator.process(&message("m11")).await.unwrap();
        let first = h.store.get(&MessageId::new("m11")).await.unwrap().unwrap();
        h.orchestrator.process(&message("m11")).await.unwrap();
        let second = h.store.get(&MessageId::new("m11")).await.unwrap().unwrap();

        assert_eq!(h.dispatcher.calls().len(), 1);
        assert_eq!(first, second);
        assert_eq!(h.store.record_count(), 1);
        assert_eq!(h.acknowledger.acked().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_duplicate_record_is_tolerated() {
        let h = harness(DispatchResult::Accepted);
        h.store.hide_from_exists(true);
        h.store
            .record(&ProcessedRecord::now(MessageId::new("m12")))
            .await
            .unwrap();

        let report = h.orchestrator.process(&message("m12")).await.unwrap();

        assert_eq!(report.outcome, ProcessingOutcome::Processed);
        assert!(report.record_was_present);
        assert_eq!(h.acknowledger.acked(), vec!["rh-m12".to_owned()]);
    }
}
