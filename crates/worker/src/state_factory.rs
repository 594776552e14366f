use std::sync::Arc;

use seedbomb_aws::AwsBaseConfig;
use seedbomb_state::DedupStore;
use seedbomb_state_memory::MemoryDedupStore;
#[cfg(feature = "dynamodb")]
use seedbomb_state_dynamodb::{DynamoConfig, DynamoDedupStore};
use tracing::{info, warn};

use crate::config::StateConfig;
use crate::error::WorkerError;

/// Create a dedup store from the given configuration.
///
/// `DynamoDB` settings missing from `[state]` fall back to the `[aws]` section.
#[allow(clippy::unused_async)]
#[cfg_attr(not(feature = "dynamodb"), allow(unused_variables))]
pub async fn create_store(
    config: &StateConfig,
    aws: &AwsBaseConfig,
) -> Result<Arc<dyn DedupStore>, WorkerError> {
    let store: Arc<dyn DedupStore> = match config.backend.as_str() {
        "memory" => {
            warn!("using in-memory dedup store; processed ids are lost on restart");
            Arc::new(MemoryDedupStore::new())
        }
        #[cfg(feature = "dynamodb")]
        "dynamodb" => {
            let dynamo_config = dynamo_config(config, aws);

            if config.create_table {
                let client = seedbomb_state_dynamodb::build_client(&dynamo_config).await;
                seedbomb_state_dynamodb::create_table(&client, &dynamo_config.table_name)
                    .await
                    .map_err(|e| WorkerError::Config(format!("dynamodb table creation: {e}")))?;
            }

            info!(table = %dynamo_config.table_name, "using DynamoDB dedup store");
            Arc::new(DynamoDedupStore::new(&dynamo_config).await)
        }
        other => {
            return Err(WorkerError::Config(format!(
                "unsupported state backend: {other}"
            )));
        }
    };

    Ok(store)
}

#[cfg(feature = "dynamodb")]
fn dynamo_config(config: &StateConfig, aws: &AwsBaseConfig) -> DynamoConfig {
    let defaults = DynamoConfig::default();
    DynamoConfig {
        table_name: config.table_name.clone().unwrap_or(defaults.table_name),
        region: config.region.clone().unwrap_or_else(|| aws.region.clone()),
        endpoint_url: config
            .endpoint_url
            .clone()
            .or_else(|| aws.endpoint_url.clone()),
        key_prefix: config.prefix.clone().unwrap_or(defaults.key_prefix),
    }
}
