//! GitHub Actions workflow-dispatch dispatcher for seedbomb.
//!
//! This crate implements the
//! [`ActionDispatcher`](seedbomb_provider::ActionDispatcher) trait by calling
//! `POST /repos/{owner}/{repo}/actions/workflows/{workflow_id}/dispatches`.
//! Exactly one request is made per call; HTTP 204 is the only accepted
//! status.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use seedbomb_github::{GitHubConfig, GitHubWorkflowDispatcher};
//!
//! let config = GitHubConfig::default().with_timeout_secs(15);
//! let dispatcher = GitHubWorkflowDispatcher::new("github", config).unwrap();
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;

pub use config::GitHubConfig;
pub use dispatcher::GitHubWorkflowDispatcher;
pub use error::GitHubError;
