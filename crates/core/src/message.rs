use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AckToken, MessageId};

/// Delivery attribute carrying how many times the queue has handed out the
/// message, including the current delivery.
pub const RECEIVE_COUNT_ATTRIBUTE: &str = "ApproximateReceiveCount";

/// A single queue delivery awaiting processing.
///
/// The `id` is stable across redeliveries of the same queue entry but is not
/// guaranteed to be unique per logical request: a producer that enqueues the
/// same request twice yields two ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Queue-assigned message identifier.
    pub id: MessageId,
    /// Raw message body. Carries the provisioning target.
    pub body: String,
    /// Handle used to acknowledge (delete) this delivery.
    pub ack_token: AckToken,
    /// Delivery attributes reported by the queue.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl InboundMessage {
    /// Create a message with no delivery attributes.
    pub fn new(
        id: impl Into<MessageId>,
        body: impl Into<String>,
        ack_token: impl Into<AckToken>,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            ack_token: ack_token.into(),
            attributes: HashMap::new(),
        }
    }

    /// Attach a delivery attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Number of times the queue has delivered this message, if reported.
    pub fn receive_count(&self) -> Option<u32> {
        self.attributes
            .get(RECEIVE_COUNT_ATTRIBUTE)
            .and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_count_parsed_from_attributes() {
        let msg = InboundMessage::new("m1", "{}", "rh-1").with_attribute(RECEIVE_COUNT_ATTRIBUTE, "3");
        assert_eq!(msg.receive_count(), Some(3));
    }

    #[test]
    fn receive_count_missing_or_garbled() {
        let msg = InboundMessage::new("m1", "{}", "rh-1");
        assert_eq!(msg.receive_count(), None);

        let msg = msg.with_attribute(RECEIVE_COUNT_ATTRIBUTE, "many");
        assert_eq!(msg.receive_count(), None);
    }
}
