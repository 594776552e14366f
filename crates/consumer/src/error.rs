use seedbomb_core::MessageId;
use seedbomb_provider::{AckError, CredentialError};
use seedbomb_state::StateError;
use thiserror::Error;

use crate::state::ProcessingState;

/// Classified reasons a message could not be processed.
///
/// None of these are recovered locally: the message stays on the queue and
/// its redelivery is the retry.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The dedup store could not be read or written.
    #[error("dedup store unavailable: {0}")]
    StoreUnavailable(#[from] StateError),

    /// The dispatch credential could not be fetched.
    #[error("credential unavailable: {0}")]
    CredentialUnavailable(#[from] CredentialError),

    /// The dispatch endpoint answered with a non-success status.
    #[error("dispatch rejected with HTTP {status}: {body}")]
    DispatchRejected { status: u16, body: String },

    /// The dispatch request never produced a response.
    #[error("dispatch transport failure: {0}")]
    TransportFailure(String),

    /// The message could not be removed from the queue.
    #[error("acknowledge failed: {0}")]
    AckFailed(#[from] AckError),

    /// The message body does not name a provisioning target.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProcessingError {
    /// Short machine-friendly label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::CredentialUnavailable(_) => "credential_unavailable",
            Self::DispatchRejected { .. } => "dispatch_rejected",
            Self::TransportFailure(_) => "transport_failure",
            Self::AckFailed(_) => "ack_failed",
            Self::InvalidMessage(_) => "invalid_message",
        }
    }
}

/// A message that ended in [`ProcessingState::Failed`].
#[derive(Debug, Error)]
#[error("message {message_id} failed in state {state}: {error}")]
pub struct ProcessingFailure {
    /// Id of the message that failed.
    pub message_id: MessageId,
    /// The state the orchestrator was in when the error occurred.
    pub state: ProcessingState,
    /// Classified cause.
    #[source]
    pub error: ProcessingError,
    /// Every state visited, ending with [`ProcessingState::Failed`].
    pub path: Vec<ProcessingState>,
}
