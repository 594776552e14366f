use std::collections::HashMap;

use seedbomb_core::InboundMessage;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ProcessingFailure;
use crate::processor::{Orchestrator, ProcessingReport};

/// A queue-delivery event in the shape AWS Lambda passes to SQS-triggered
/// functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SqsRecord>,
}

/// One message inside an [`SqsEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsRecord {
    pub message_id: String,
    pub receipt_handle: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(
        rename = "eventSourceARN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub event_source_arn: Option<String>,
}

impl From<SqsRecord> for InboundMessage {
    fn from(record: SqsRecord) -> Self {
        let mut message = InboundMessage::new(record.message_id, record.body, record.receipt_handle);
        message.attributes = record.attributes;
        message
    }
}

impl Orchestrator {
    /// Process every record of an event in order.
    ///
    /// Stops at the first failure and returns it; records after it are left
    /// for redelivery. An event without records succeeds with no reports.
    #[instrument(name = "consumer.handle_event", skip_all, fields(records = event.records.len()))]
    pub async fn handle_event(
        &self,
        event: SqsEvent,
    ) -> Result<Vec<ProcessingReport>, ProcessingFailure> {
        let mut reports = Vec::with_capacity(event.records.len());
        for record in event.records {
            let message = InboundMessage::from(record);
            reports.push(self.process(&message).await?);
        }
        info!(processed = reports.len(), "event handled");
        Ok(reports)
    }
}
