use async_trait::async_trait;

use seedbomb_core::AckToken;

use crate::error::AckError;

/// Removes a processed message from the queue.
///
/// A failed acknowledgment leaves the message visible again once the queue's
/// visibility timeout lapses; that redelivery is the only retry mechanism.
#[async_trait]
pub trait MessageAcknowledger: Send + Sync {
    async fn acknowledge(&self, token: &AckToken) -> Result<(), AckError>;
}
