mod sections;
mod state;
mod telemetry;


pub use sections::*;
pub use state::*;
pub use telemetry::*;

use std::path::Path;

use seedbomb_aws::AwsBaseConfig;
use seedbomb_consumer::RequestTemplate;
use serde::Deserialize;

use crate::error::WorkerError;

/// Top-level configuration for the worker, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct WorkerConfig {
    /// Queue polling configuration.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Shared AWS settings (region, role, endpoint override).
    #[serde(default)]
    pub aws: AwsBaseConfig,
    /// Dedup store backend.
    #[serde(default)]
    pub state: StateConfig,
    /// Secret holding the dispatch token.
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Workflow-dispatch client.
    #[serde(default)]
    pub github: GitHubSection,
    /// Workflow coordinates and body-to-input mapping.
    #[serde(default)]
    pub target: RequestTemplate,
    /// Log output and `OpenTelemetry` tracing.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl WorkerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, WorkerError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load the configuration file at `path`, or defaults if it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, WorkerError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Self::from_toml("")
        }
    }
}
