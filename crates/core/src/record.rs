use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MessageId;

/// Durable marker that the downstream action for a message was accepted.
///
/// Existence of a record for an id implies the dispatch for the message that
/// produced it succeeded at least once. Records are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub message_id: MessageId,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedRecord {
    /// Create a record stamped with the given time.
    pub fn new(message_id: impl Into<MessageId>, processed_at: DateTime<Utc>) -> Self {
        Self {
            message_id: message_id.into(),
            processed_at,
        }
    }

    /// Create a record stamped with the current time.
    pub fn now(message_id: impl Into<MessageId>) -> Self {
        Self::new(message_id, Utc::now())
    }
}
