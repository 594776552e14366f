use serde::{Deserialize, Serialize};

/// STS session name used when `session_name` is unset.
pub const DEFAULT_SESSION_NAME: &str = "seedbomb-consumer";

/// AWS settings shared by the queue, secret and dedup-table clients.
///
/// Deserialized from the worker's `[aws]` section and flattened into each
/// service config. Every field is optional in TOML.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// IAM role to assume via STS before talking to any service.
    pub role_arn: Option<String>,

    /// Endpoint override for `LocalStack` or other emulators.
    pub endpoint_url: Option<String>,

    /// STS session name; [`DEFAULT_SESSION_NAME`] when unset.
    pub session_name: Option<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .finish()
    }
}

impl AwsBaseConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
        }
    }

    /// Assume `role_arn` via STS.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Send every request to `endpoint_url` instead of the AWS endpoint.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// The STS session name to use for assume-role.
    pub fn session_name(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_us_east_1() {
        let config = AwsBaseConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.role_arn.is_none());
        assert!(config.endpoint_url.is_none());
        assert_eq!(config.session_name(), DEFAULT_SESSION_NAME);
    }

    #[test]
    fn explicit_session_name_wins() {
        let config = AwsBaseConfig {
            session_name: Some("provisioning-worker".into()),
            ..AwsBaseConfig::default()
        };
        assert_eq!(config.session_name(), "provisioning-worker");
    }

    #[test]
    fn debug_redacts_role_arn() {
        let config = AwsBaseConfig::new("us-east-1")
            .with_role_arn("arn:aws:iam::123456789012:role/seedbomb-consumer");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("123456789012"));
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let config: AwsBaseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn deserialize_localstack_section() {
        let config: AwsBaseConfig = serde_json::from_value(serde_json::json!({
            "region": "ap-southeast-2",
            "endpoint_url": "http://localhost:4566"
        }))
        .unwrap();
        assert_eq!(config.region, "ap-southeast-2");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert!(config.role_arn.is_none());
    }
}
