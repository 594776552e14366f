use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};

use seedbomb_core::MessageId;

/// Partition key attribute.
pub const PK: &str = "pk";
/// Plain message id, stored for operators browsing the table.
pub const MESSAGE_ID: &str = "message_id";
/// RFC 3339 timestamp of the first successful record.
pub const PROCESSED_AT: &str = "processed_at";

/// Build the partition key from a prefix and message id.
///
/// Format: `{prefix}:{message_id}`
pub fn build_pk(prefix: &str, id: &MessageId) -> String {
    format!("{prefix}:{id}")
}

/// Create the `DynamoDB` table programmatically.
///
/// The table uses a single `pk` (String) partition key and on-demand billing.
/// This is intended for tests and local development. In production you would
/// typically provision the table via Infrastructure-as-Code tooling.
///
/// # Errors
///
/// Returns an error if the `CreateTable` call fails for reasons other than
/// the table already existing.
pub async fn create_table(
    client: &Client,
    table_name: &str,
) -> Result<(), aws_sdk_dynamodb::Error> {
    let result = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(PK)
                .key_type(KeyType::Hash)
                .build()
                .expect("valid key schema"),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(PK)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("valid attribute definition"),
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            // Tolerate "table already exists" errors so `create_table` is idempotent.
            let service_err = err.into_service_error();
            if service_err.is_resource_in_use_exception() {
                Ok(())
            } else {
                Err(service_err.into())
            }
        }
    }
}
