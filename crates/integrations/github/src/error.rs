use seedbomb_core::DispatchResult;
use thiserror::Error;

/// Errors specific to the GitHub dispatcher.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl From<GitHubError> for DispatchResult {
    fn from(err: GitHubError) -> Self {
        let cause = match &err {
            GitHubError::Http(e) if e.is_timeout() => format!("request timed out: {e}"),
            GitHubError::Http(e) if e.is_connect() => format!("connection failed: {e}"),
            _ => err.to_string(),
        };
        DispatchResult::TransportFailure { cause }
    }
}
