use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use seedbomb_core::{AckToken, InboundMessage};
use seedbomb_provider::{AckError, MessageAcknowledger};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsError, classify_sdk_error};

/// Configuration for the provisioning queue.
#[derive(Clone, Serialize, Deserialize)]
pub struct SqsConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// URL of the queue to consume.
    pub queue_url: String,

    /// Long-poll wait per receive call, in seconds (0-20).
    #[serde(default = "default_wait_time_seconds")]
    pub wait_time_seconds: i32,

    /// Visibility timeout applied to received messages. `None` keeps the
    /// queue's own setting.
    #[serde(default)]
    pub visibility_timeout_seconds: Option<i32>,
}

impl std::fmt::Debug for SqsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsConfig")
            .field("aws", &self.aws)
            .field("queue_url", &self.queue_url)
            .field("wait_time_seconds", &self.wait_time_seconds)
            .field("visibility_timeout_seconds", &self.visibility_timeout_seconds)
            .finish()
    }
}

impl SqsConfig {
    /// Create a new `SqsConfig` for the given queue and AWS region.
    pub fn new(region: impl Into<String>, queue_url: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            queue_url: queue_url.into(),
            wait_time_seconds: default_wait_time_seconds(),
            visibility_timeout_seconds: None,
        }
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the visibility timeout applied on receive.
    #[must_use]
    pub fn with_visibility_timeout(mut self, seconds: i32) -> Self {
        self.visibility_timeout_seconds = Some(seconds);
        self
    }
}

fn default_wait_time_seconds() -> i32 {
    20
}

fn sdk_error<E, R>(err: &aws_sdk_sqs::error::SdkError<E, R>) -> AwsError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    classify_sdk_error(&DisplayErrorContext(err).to_string())
}

/// Convert an SQS message into an [`InboundMessage`].
///
/// A message without an id or receipt handle cannot be deduplicated or
/// acknowledged and is rejected.
pub fn to_inbound(message: Message) -> Result<InboundMessage, AwsError> {
    let id = message
        .message_id
        .ok_or_else(|| AwsError::InvalidPayload("message has no message id".to_owned()))?;
    let receipt_handle = message
        .receipt_handle
        .ok_or_else(|| AwsError::InvalidPayload(format!("message {id} has no receipt handle")))?;

    let mut inbound = InboundMessage::new(id, message.body.unwrap_or_default(), receipt_handle);
    for (name, value) in message.attributes.unwrap_or_default() {
        inbound = inbound.with_attribute(name.as_str(), value);
    }
    Ok(inbound)
}

/// Long-polls the provisioning queue, one message per call.
pub struct SqsReceiver {
    config: SqsConfig,
    client: aws_sdk_sqs::Client,
}

impl std::fmt::Debug for SqsReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsReceiver")
            .field("config", &self.config)
            .field("client", &"<SqsClient>")
            .finish()
    }
}

impl SqsReceiver {
    /// Create a new `SqsReceiver` by building an AWS SDK client.
    pub async fn new(config: SqsConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        let client = aws_sdk_sqs::Client::new(&sdk_config);
        Self { config, client }
    }

    /// Create an `SqsReceiver` with a pre-built client (for testing).
    pub fn with_client(config: SqsConfig, client: aws_sdk_sqs::Client) -> Self {
        Self { config, client }
    }

    /// An acknowledger for the same queue, sharing this receiver's client.
    pub fn acknowledger(&self) -> SqsAcknowledger {
        SqsAcknowledger::with_client(self.client.clone(), self.config.queue_url.clone())
    }

    /// Wait up to `wait_time_seconds` for a single message.
    ///
    /// Returns `Ok(None)` when the long poll ends without a delivery.
    #[instrument(skip(self), fields(queue_url = %self.config.queue_url))]
    pub async fn receive(&self) -> Result<Option<InboundMessage>, AwsError> {
        let mut request = self
            .client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(self.config.wait_time_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .message_system_attribute_names(MessageSystemAttributeName::SentTimestamp);

        if let Some(visibility) = self.config.visibility_timeout_seconds {
            request = request.visibility_timeout(visibility);
        }

        let output = request.send().await.map_err(|e| {
            let err = sdk_error(&e);
            error!(error = %err, "SQS receive_message failed");
            err
        })?;

        let Some(message) = output.messages.and_then(|msgs| msgs.into_iter().next()) else {
            return Ok(None);
        };

        let inbound = to_inbound(message)?;
        debug!(
            message_id = %inbound.id,
            receive_count = ?inbound.receive_count(),
            "received message"
        );
        Ok(Some(inbound))
    }
}

/// Acknowledges processed messages by deleting them from the queue.
pub struct SqsAcknowledger {
    queue_url: String,
    client: aws_sdk_sqs::Client,
}

impl std::fmt::Debug for SqsAcknowledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsAcknowledger")
            .field("queue_url", &self.queue_url)
            .field("client", &"<SqsClient>")
            .finish()
    }
}

impl SqsAcknowledger {
    /// Create a new `SqsAcknowledger` by building an AWS SDK client.
    pub async fn new(config: &SqsConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        Self::with_client(
            aws_sdk_sqs::Client::new(&sdk_config),
            config.queue_url.clone(),
        )
    }

    /// Create an `SqsAcknowledger` with a pre-built client.
    pub fn with_client(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            client,
        }
    }
}

#[async_trait]
impl MessageAcknowledger for SqsAcknowledger {
    #[instrument(skip(self, token), fields(queue_url = %self.queue_url))]
    async fn acknowledge(&self, token: &AckToken) -> Result<(), AckError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(token.as_str())
            .send()
            .await
            .map_err(|e| {
                let err = sdk_error(&e);
                error!(error = %err, "SQS delete_message failed");
                AckError::from(err)
            })?;

        info!("message deleted from queue");
        Ok(())
    }
}
