use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use seedbomb_core::Credential;
use seedbomb_provider::{CredentialError, CredentialProvider};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsError, classify_sdk_error};

/// Configuration for the dispatch token secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsManagerConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Name or ARN of the secret.
    #[serde(default = "default_secret_name")]
    pub secret_name: String,

    /// JSON field inside the secret string holding the token.
    #[serde(default = "default_secret_field")]
    pub secret_field: String,
}

impl Default for SecretsManagerConfig {
    fn default() -> Self {
        Self {
            aws: AwsBaseConfig::default(),
            secret_name: default_secret_name(),
            secret_field: default_secret_field(),
        }
    }
}

impl SecretsManagerConfig {
    /// Create a config reading `secret_field` from `secret_name`.
    pub fn new(secret_name: impl Into<String>, secret_field: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::default(),
            secret_name: secret_name.into(),
            secret_field: secret_field.into(),
        }
    }
}

fn default_secret_name() -> String {
    "prod/GitHubCredentials".to_owned()
}

fn default_secret_field() -> String {
    "github_pat".to_owned()
}

/// Extract a non-empty string field from a JSON object secret payload.
pub fn parse_secret_payload(payload: &str, field: &str) -> Result<String, AwsError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| AwsError::InvalidPayload(format!("secret is not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| AwsError::InvalidPayload("secret is not a JSON object".to_owned()))?;

    match object
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
    {
        Some(token) if !token.is_empty() => Ok(token.to_owned()),
        Some(_) => Err(AwsError::InvalidPayload(format!(
            "secret field '{field}' is empty"
        ))),
        None => Err(AwsError::InvalidPayload(format!(
            "secret has no string field '{field}'"
        ))),
    }
}

/// Fetches the dispatch token from AWS Secrets Manager.
///
/// Every call to [`fetch`](CredentialProvider::fetch) performs a live
/// `GetSecretValue`, so rotated secrets take effect on the next message.
pub struct SecretsManagerCredentialProvider {
    config: SecretsManagerConfig,
    client: aws_sdk_secretsmanager::Client,
}

impl std::fmt::Debug for SecretsManagerCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManagerCredentialProvider")
            .field("config", &self.config)
            .field("client", &"<SecretsManagerClient>")
            .finish()
    }
}

impl SecretsManagerCredentialProvider {
    /// Create a provider by building an AWS SDK client.
    pub async fn new(config: SecretsManagerConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        let client = aws_sdk_secretsmanager::Client::new(&sdk_config);
        Self { config, client }
    }

    /// Create a provider with a pre-built client.
    pub fn with_client(
        config: SecretsManagerConfig,
        client: aws_sdk_secretsmanager::Client,
    ) -> Self {
        Self { config, client }
    }

    async fn fetch_token(&self) -> Result<String, AwsError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(&self.config.secret_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&DisplayErrorContext(&e).to_string()))?;

        let payload = output.secret_string().ok_or_else(|| {
            AwsError::NotFound(format!(
                "secret '{}' has no string value",
                self.config.secret_name
            ))
        })?;

        parse_secret_payload(payload, &self.config.secret_field)
    }
}

#[async_trait]
impl CredentialProvider for SecretsManagerCredentialProvider {
    #[instrument(skip(self), fields(secret = %self.config.secret_name))]
    async fn fetch(&self) -> Result<Credential, CredentialError> {
        match self.fetch_token().await {
            Ok(token) => {
                debug!("fetched dispatch credential");
                Ok(Credential::new(token))
            }
            Err(err) => {
                error!(error = %err, "failed to fetch dispatch credential");
                Err(err.into())
            }
        }
    }
}
