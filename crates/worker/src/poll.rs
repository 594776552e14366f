use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use seedbomb_aws::{AwsError, SqsReceiver};
use seedbomb_consumer::{MetricsSnapshot, Orchestrator};
use seedbomb_core::InboundMessage;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Base delay after a failed receive.
const BASE_POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Ceiling for the poll error backoff.
const MAX_POLL_BACKOFF: Duration = Duration::from_secs(60);

/// Where the poll loop gets its messages from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for at most one message. `Ok(None)` means the wait ended empty.
    async fn receive(&self) -> Result<Option<InboundMessage>, AwsError>;
}

#[async_trait]
impl MessageSource for SqsReceiver {
    async fn receive(&self) -> Result<Option<InboundMessage>, AwsError> {
        SqsReceiver::receive(self).await
    }
}

/// Delay before the next receive after `consecutive_errors` failures in a
/// row: 5s, 10s, 20s, 40s, then 60s.
pub fn poll_error_backoff(consecutive_errors: u32) -> Duration {
    let exponent = consecutive_errors.saturating_sub(1).min(16);
    BASE_POLL_BACKOFF
        .saturating_mul(2_u32.saturating_pow(exponent))
        .min(MAX_POLL_BACKOFF)
}

/// Run `concurrency` independent poll tasks until `shutdown` flips to `true`
/// (or its sender is dropped).
///
/// A message already handed to the orchestrator is always processed to a
/// terminal state; shutdown only interrupts waiting. Returns the final
/// metrics snapshot.
pub async fn run(
    source: Arc<dyn MessageSource>,
    orchestrator: Arc<Orchestrator>,
    concurrency: usize,
    shutdown: watch::Receiver<bool>,
) -> MetricsSnapshot {
    let workers = concurrency.max(1);
    info!(workers, "starting poll loop");

    let mut tasks = JoinSet::new();
    for worker_id in 0..workers {
        tasks.spawn(poll_task(
            worker_id,
            Arc::clone(&source),
            Arc::clone(&orchestrator),
            shutdown.clone(),
        ));
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "poll task terminated abnormally");
        }
    }

    let snapshot = orchestrator.metrics().snapshot();
    info!(
        received = snapshot.received,
        processed = snapshot.processed,
        already_processed = snapshot.already_processed,
        dispatch_rejected = snapshot.dispatch_rejected,
        transport_failures = snapshot.transport_failures,
        failed = snapshot.failed,
        "poll loop stopped"
    );
    snapshot
}

async fn poll_task(
    worker_id: usize,
    source: Arc<dyn MessageSource>,
    orchestrator: Arc<Orchestrator>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut consecutive_errors: u32 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let received = tokio::select! {
            result = source.receive() => result,
            _ = shutdown.changed() => break,
        };

        match received {
            Ok(Some(message)) => {
                consecutive_errors = 0;
                if let Err(failure) = orchestrator.process(&message).await {
                    warn!(
                        worker_id,
                        message_id = %failure.message_id,
                        state = %failure.state,
                        kind = failure.error.kind(),
                        "message left on queue for redelivery"
                    );
                }
            }
            Ok(None) => {
                if consecutive_errors > 0 {
                    info!(worker_id, previous_errors = consecutive_errors, "queue polling recovered");
                }
                consecutive_errors = 0;
            }
            Err(e) => {
                consecutive_errors = consecutive_errors.saturating_add(1);
                let backoff = poll_error_backoff(consecutive_errors);
                error!(
                    worker_id,
                    error = %e,
                    consecutive_errors,
                    backoff_secs = backoff.as_secs(),
                    "failed to receive from queue, backing off"
                );
                tokio::select! {
                    () = tokio::time::sleep(backoff) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }
    }

    info!(worker_id, "poll task stopped");
}
