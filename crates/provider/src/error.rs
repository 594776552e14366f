use thiserror::Error;

/// Errors from fetching the dispatch credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The named secret does not exist or has no string value.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The secret exists but does not have the expected structure.
    #[error("malformed secret: {0}")]
    Malformed(String),

    /// The secret store could not be reached or refused the request.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from acknowledging (deleting) a queue message.
#[derive(Debug, Error)]
pub enum AckError {
    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The queue service rejected the request (e.g. an expired receipt handle).
    #[error("queue service error: {0}")]
    Service(String),
}
