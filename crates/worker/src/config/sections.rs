use seedbomb_github::GitHubConfig;
use serde::Deserialize;

/// Configuration for the provisioning queue and the poll loop.
///
/// # Example
///
/// ```toml
/// [queue]
/// queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/SeedBombProvisioningQueue"
/// wait_time_seconds = 20
/// visibility_timeout_seconds = 120
/// concurrency = 4
/// ```
#[derive(Debug, Deserialize)]
pub struct QueueConfig {
    /// URL of the queue to consume. Required by `run`.
    #[serde(default)]
    pub queue_url: Option<String>,
    /// Long-poll wait per receive call, in seconds.
    #[serde(default = "default_wait_time_seconds")]
    pub wait_time_seconds: i32,
    /// Visibility timeout applied on receive. Unset keeps the queue's setting.
    #[serde(default)]
    pub visibility_timeout_seconds: Option<i32>,
    /// Number of independent poll tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_url: None,
            wait_time_seconds: default_wait_time_seconds(),
            visibility_timeout_seconds: None,
            concurrency: default_concurrency(),
        }
    }
}

fn default_wait_time_seconds() -> i32 {
    20
}

fn default_concurrency() -> usize {
    1
}

/// Location of the dispatch token in Secrets Manager.
#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    /// Secret name or ARN.
    #[serde(default = "default_secret_name")]
    pub secret_name: String,
    /// JSON field inside the secret holding the token.
    #[serde(default = "default_secret_field")]
    pub secret_field: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            secret_name: default_secret_name(),
            secret_field: default_secret_field(),
        }
    }
}

fn default_secret_name() -> String {
    "prod/GitHubCredentials".to_owned()
}

fn default_secret_field() -> String {
    "github_pat".to_owned()
}

/// Workflow-dispatch client settings.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubSection {
    /// HTTP client settings for the dispatch API.
    #[serde(flatten)]
    pub client: GitHubConfig,
    /// Log dispatches instead of sending them.
    #[serde(default)]
    pub dry_run: bool,
}
