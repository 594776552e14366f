use std::sync::Arc;

use seedbomb_aws::{SecretsManagerConfig, SecretsManagerCredentialProvider, SqsConfig};
use seedbomb_consumer::{Orchestrator, OrchestratorBuilder};
use seedbomb_github::GitHubWorkflowDispatcher;
use seedbomb_provider::{DynActionDispatcher, LogDispatcher, MessageAcknowledger};
use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::state_factory;

/// SQS settings for `queue_url`, sharing the `[aws]` section.
pub fn sqs_config(config: &WorkerConfig, queue_url: &str) -> SqsConfig {
    SqsConfig {
        aws: config.aws.clone(),
        queue_url: queue_url.to_owned(),
        wait_time_seconds: config.queue.wait_time_seconds,
        visibility_timeout_seconds: config.queue.visibility_timeout_seconds,
    }
}

/// The configured queue URL, required by the poll loop.
pub fn required_queue_url(config: &WorkerConfig) -> Result<&str, WorkerError> {
    config
        .queue
        .queue_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| WorkerError::Config("[queue] queue_url is required".into()))
}

/// Derive a queue URL from an SQS queue ARN
/// (`arn:aws:sqs:{region}:{account}:{name}`).
pub fn queue_url_from_arn(arn: &str) -> Option<String> {
    let mut parts = arn.split(':');
    let (Some("arn"), Some(partition), Some("sqs"), Some(region), Some(account), Some(name), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    if region.is_empty() || account.is_empty() || name.is_empty() {
        return None;
    }
    let suffix = if partition == "aws-cn" {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    };
    Some(format!("https://sqs.{region}.{suffix}/{account}/{name}"))
}

/// The dispatcher selected by `[github] dry_run`.
pub fn dispatcher(config: &WorkerConfig) -> Result<Arc<dyn DynActionDispatcher>, WorkerError> {
    if config.github.dry_run {
        warn!("dry run enabled; workflows will be logged, not dispatched");
        return Ok(Arc::new(LogDispatcher::new("dry-run")));
    }
    Ok(Arc::new(GitHubWorkflowDispatcher::new(
        "github",
        config.github.client.clone(),
    )?))
}

/// Refuse a non-durable dedup store unless the config opts into it with
/// `[state] allow_memory` or `[github] dry_run`.
pub fn ensure_durable_store(config: &WorkerConfig) -> Result<(), WorkerError> {
    if config.state.backend == "memory" && !config.state.allow_memory && !config.github.dry_run {
        return Err(WorkerError::Config(
            "[state] backend \"memory\" loses processed ids on restart; \
             use \"dynamodb\", or set allow_memory = true or [github] dry_run = true"
                .into(),
        ));
    }
    Ok(())
}

/// Assemble the orchestrator with production collaborators.
pub async fn build_orchestrator(
    config: &WorkerConfig,
    acknowledger: Arc<dyn MessageAcknowledger>,
) -> Result<Orchestrator, WorkerError> {
    ensure_durable_store(config)?;
    let store = state_factory::create_store(&config.state, &config.aws).await?;

    let secrets_config = SecretsManagerConfig {
        aws: config.aws.clone(),
        secret_name: config.credentials.secret_name.clone(),
        secret_field: config.credentials.secret_field.clone(),
    };
    let credentials = Arc::new(SecretsManagerCredentialProvider::new(secrets_config).await);

    let dispatcher = dispatcher(config)?;

    info!(
        backend = %config.state.backend,
        dispatcher = %dispatcher.name(),
        owner = %config.target.owner,
        repo = %config.target.repo,
        workflow_id = %config.target.workflow_id,
        "orchestrator assembled"
    );

    Ok(OrchestratorBuilder::new()
        .store(store)
        .credentials(credentials)
        .dispatcher(dispatcher)
        .acknowledger(acknowledger)
        .template(config.target.clone())
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_url_from_standard_arn() {
        assert_eq!(
            queue_url_from_arn("arn:aws:sqs:us-east-1:111122223333:SeedBombProvisioningQueue")
                .as_deref(),
            Some("https://sqs.us-east-1.amazonaws.com/111122223333/SeedBombProvisioningQueue")
        );
    }

    #[test]
    fn queue_url_from_china_arn() {
        assert_eq!(
            queue_url_from_arn("arn:aws-cn:sqs:cn-north-1:111122223333:q").as_deref(),
            Some("https://sqs.cn-north-1.amazonaws.com.cn/111122223333/q")
        );
    }

    #[test]
    fn queue_url_from_bad_arn() {
        assert!(queue_url_from_arn("arn:aws:sns:us-east-1:111122223333:topic").is_none());
        assert!(queue_url_from_arn("arn:aws:sqs:us-east-1:111122223333").is_none());
        assert!(queue_url_from_arn("arn:aws:sqs:us-east-1::q").is_none());
        assert!(queue_url_from_arn("not-an-arn").is_none());
    }

    #[test]
    fn queue_url_is_required() {
        let config = WorkerConfig::default();
        assert!(matches!(
            required_queue_url(&config),
            Err(WorkerError::Config(_))
        ));

        let config = WorkerConfig::from_toml("[queue]\nqueue_url = \"\"").unwrap();
        assert!(required_queue_url(&config).is_err());
    }

    #[test]
    fn sqs_config_shares_aws_section() {
        let config = WorkerConfig::from_toml(
            "[aws]\nregion = \"eu-west-1\"\n[queue]\nqueue_url = \"https://sqs/q\"\nvisibility_timeout_seconds = 90",
        )
        .unwrap();
        let url = required_queue_url(&config).unwrap();
        let sqs = sqs_config(&config, url);
        assert_eq!(sqs.queue_url, "https://sqs/q");
        assert_eq!(sqs.aws.region, "eu-west-1");
        assert_eq!(sqs.visibility_timeout_seconds, Some(90));
        assert_eq!(sqs.wait_time_seconds, 20);
    }

    #[test]
    fn memory_backend_is_refused_by_default() {
        let Err(err) = ensure_durable_store(&WorkerConfig::default()) else {
            panic!("expected the default memory backend to be refused");
        };
        assert!(matches!(err, WorkerError::Config(_)));
        assert!(err.to_string().contains("allow_memory"));
    }

    #[test]
    fn memory_backend_allowed_when_opted_in() {
        let config = WorkerConfig::from_toml("[state]\nallow_memory = true").unwrap();
        assert!(ensure_durable_store(&config).is_ok());

        let config = WorkerConfig::from_toml("[github]\ndry_run = true").unwrap();
        assert!(ensure_durable_store(&config).is_ok());
    }

    #[test]
    fn dynamodb_backend_is_always_allowed() {
        let config = WorkerConfig::from_toml("[state]\nbackend = \"dynamodb\"").unwrap();
        assert!(ensure_durable_store(&config).is_ok());
    }

    #[tokio::test]
    async fn build_orchestrator_refuses_memory_backend() {
        let acknowledger = Arc::new(seedbomb_consumer::testing::RecordingAcknowledger::new());
        let Err(err) = build_orchestrator(&WorkerConfig::default(), acknowledger).await else {
            panic!("expected the memory backend to be refused");
        };
        assert!(matches!(err, WorkerError::Config(_)));
    }

    #[test]
    fn dry_run_selects_log_dispatcher() {
        let config = WorkerConfig::from_toml("[github]\ndry_run = true").unwrap();
        assert_eq!(dispatcher(&config).unwrap().name(), "dry-run");
    }

    #[test]
    fn default_selects_github_dispatcher() {
        let config = WorkerConfig::default();
        assert_eq!(dispatcher(&config).unwrap().name(), "github");
    }
}
