use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, instrument};

use seedbomb_core::{MessageId, ProcessedRecord};
use seedbomb_state::error::StateError;
use seedbomb_state::store::DedupStore;

use crate::config::DynamoConfig;
use crate::table::{MESSAGE_ID, PK, PROCESSED_AT, build_pk};

/// DynamoDB-backed implementation of [`DedupStore`].
///
/// One item per processed message, keyed by `pk`. Reads are strongly
/// consistent so a record written by one worker is visible to the next
/// delivery's check. Writes are conditional on `attribute_not_exists(pk)`,
/// which makes the record write-once.
pub struct DynamoDedupStore {
    client: Client,
    table_name: String,
    prefix: String,
}

impl DynamoDedupStore {
    /// Create a new `DynamoDedupStore` from the provided configuration.
    ///
    /// Loads AWS credentials and configuration from the environment and
    /// optionally overrides the endpoint URL for local development.
    pub async fn new(config: &DynamoConfig) -> Self {
        let client = build_client(config).await;
        Self::from_client(client, config)
    }

    /// Create a new `DynamoDedupStore` from an existing `DynamoDB` client.
    pub fn from_client(client: Client, config: &DynamoConfig) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
            prefix: config.key_prefix.clone(),
        }
    }

    async fn get_item(
        &self,
        id: &MessageId,
    ) -> Result<Option<HashMap<String, AttributeValue>>, StateError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PK, AttributeValue::S(build_pk(&self.prefix, id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;
        Ok(result.item)
    }
}

impl std::fmt::Debug for DynamoDedupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDedupStore")
            .field("table_name", &self.table_name)
            .field("prefix", &self.prefix)
            .field("client", &"<DynamoDbClient>")
            .finish()
    }
}

#[async_trait]
impl DedupStore for DynamoDedupStore {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn exists(&self, id: &MessageId) -> Result<bool, StateError> {
        Ok(self.get_item(id).await?.is_some())
    }

    #[instrument(skip(self, record), fields(table = %self.table_name, message_id = %record.message_id))]
    async fn record(&self, record: &ProcessedRecord) -> Result<bool, StateError> {
        let pk = build_pk(&self.prefix, &record.message_id);
        let processed_at = record
            .processed_at
            .to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(PK, AttributeValue::S(pk))
            .item(MESSAGE_ID, AttributeValue::S(record.message_id.to_string()))
            .item(PROCESSED_AT, AttributeValue::S(processed_at))
            .condition_expression("attribute_not_exists(pk)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if let SdkError::ServiceError(ctx) = &err
                    && ctx.err().is_conditional_check_failed_exception()
                {
                    debug!("record already present, keeping the original");
                    return Ok(false);
                }
                Err(sdk_error(&err))
            }
        }
    }

    async fn get(&self, id: &MessageId) -> Result<Option<ProcessedRecord>, StateError> {
        let Some(item) = self.get_item(id).await? else {
            return Ok(None);
        };

        let processed_at = parse_processed_at(&item)?;
        Ok(Some(ProcessedRecord::new(id.clone(), processed_at)))
    }
}

/// Parse the `processed_at` attribute of a stored item.
fn parse_processed_at(item: &HashMap<String, AttributeValue>) -> Result<DateTime<Utc>, StateError> {
    match item.get(PROCESSED_AT) {
        Some(AttributeValue::S(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StateError::Serialization(format!("invalid {PROCESSED_AT}: {e}"))),
        _ => Err(StateError::Serialization(format!(
            "{PROCESSED_AT} attribute missing or wrong type"
        ))),
    }
}

/// Map an SDK error to a [`StateError`], keeping transport failures apart
/// from service responses.
fn sdk_error<E, R>(err: &SdkError<E, R>) -> StateError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let msg = DisplayErrorContext(err).to_string();
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StateError::Connection(msg),
        _ => StateError::Backend(msg),
    }
}

/// Build an AWS `DynamoDB` [`Client`] from the provided configuration.
///
/// Uses the standard AWS SDK environment credential chain and optionally
/// overrides the endpoint URL for local development.
pub async fn build_client(config: &DynamoConfig) -> Client {
    let mut aws_config =
        aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        aws_config = aws_config.endpoint_url(endpoint);
    }

    let sdk_config = aws_config.load().await;
    Client::new(&sdk_config)
}
