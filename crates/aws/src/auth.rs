use aws_config::{ConfigLoader, Region, SdkConfig};
use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Build the SDK configuration shared by the SQS and Secrets Manager clients.
///
/// Credentials come from the standard environment chain. With `role_arn` set,
/// they are exchanged through STS for the role's credentials, which the SDK
/// refreshes before they expire.
///
/// ```no_run
/// use seedbomb_aws::auth::build_sdk_config;
/// use seedbomb_aws::config::AwsBaseConfig;
///
/// # async fn example() {
/// let config = AwsBaseConfig::new("us-east-1").with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> SdkConfig {
    let base = loader(config).load().await;

    let Some(role_arn) = &config.role_arn else {
        return base;
    };

    let session_name = config.session_name();
    info!(role_arn = %role_arn, session_name = %session_name, "assuming IAM role via STS");

    let assume_role = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(Region::new(config.region.clone()))
        .configure(&base)
        .build()
        .await;

    loader(config).credentials_provider(assume_role).load().await
}

fn loader(config: &AwsBaseConfig) -> ConfigLoader {
    let loader = aws_config::from_env().region(Region::new(config.region.clone()));
    match &config.endpoint_url {
        Some(endpoint) => {
            debug!(endpoint = %endpoint, "using custom AWS endpoint");
            loader.endpoint_url(endpoint)
        }
        None => loader,
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    // Loading an SDK config needs system root certificates, so these only run
    // in integration mode.

    #[tokio::test]
    async fn region_is_applied() {
        let sdk_config = build_sdk_config(&AwsBaseConfig::new("ap-northeast-1")).await;
        assert_eq!(
            sdk_config.region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
    }

    #[tokio::test]
    async fn endpoint_override_is_applied() {
        let config = AwsBaseConfig::new("us-west-2").with_endpoint_url("http://localhost:4566");
        let sdk_config = build_sdk_config(&config).await;
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:4566"));
    }
}
