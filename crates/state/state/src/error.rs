use thiserror::Error;

/// Errors from dedup store operations.
///
/// Every variant means the store could not answer; callers treat all of them
/// as "store unavailable" and must not guess at the processed state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
