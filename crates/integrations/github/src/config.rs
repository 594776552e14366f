use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the GitHub workflow dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API. Overridable for GitHub Enterprise and tests.
    pub api_url: String,

    /// Value of the `X-GitHub-Api-Version` header.
    pub api_version: String,

    /// Value of the `Accept` header.
    pub accept: String,

    /// Value of the `User-Agent` header (GitHub rejects requests without one).
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: default_api_version(),
            accept: default_accept(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GitHubConfig {
    /// Set the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Dispatch endpoint for the given workflow.
    pub fn dispatch_url(&self, owner: &str, repo: &str, workflow_id: &str) -> String {
        format!(
            "{}/repos/{owner}/{repo}/actions/workflows/{workflow_id}/dispatches",
            self.api_url.trim_end_matches('/')
        )
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_api_version() -> String {
    "2022-11-28".to_owned()
}

fn default_accept() -> String {
    "application/vnd.github+json".to_owned()
}

fn default_user_agent() -> String {
    concat!("seedbomb/", env!("CARGO_PKG_VERSION")).to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.api_version, "2022-11-28");
        assert_eq!(config.accept, "application/vnd.github+json");
        assert!(config.user_agent.starts_with("seedbomb/"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn dispatch_url_layout() {
        let config = GitHubConfig::default();
        assert_eq!(
            config.dispatch_url("Maxwellcoyle-dev", "ferrathorn_provisioning_test", "terraform.yml"),
            "https://api.github.com/repos/Maxwellcoyle-dev/ferrathorn_provisioning_test/actions/workflows/terraform.yml/dispatches"
        );
    }

    #[test]
    fn dispatch_url_trims_trailing_slash() {
        let config = GitHubConfig::default().with_api_url("http://127.0.0.1:9000/");
        assert_eq!(
            config.dispatch_url("o", "r", "w.yml"),
            "http://127.0.0.1:9000/repos/o/r/actions/workflows/w.yml/dispatches"
        );
    }

    #[test]
    fn deserialize_partial_uses_defaults() {
        let config: GitHubConfig =
            serde_json::from_str(r#"{"api_url":"https://ghe.example.com/api/v3"}"#).unwrap();
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.api_version, "2022-11-28");
    }
}
