use seedbomb_provider::{AckError, CredentialError};
use thiserror::Error;

/// Errors specific to AWS collaborator operations.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The AWS SDK returned an error from the service.
    #[error("AWS service error: {0}")]
    ServiceError(String),

    /// The request was throttled by the AWS service.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with AWS.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// The requested resource does not exist.
    #[error("AWS resource not found: {0}")]
    NotFound(String),

    /// A message or secret payload did not have the expected shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<AwsError> for AckError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Connection(msg) => AckError::Connection(msg),
            AwsError::Timeout => AckError::Connection("request timed out".to_owned()),
            AwsError::Throttled => AckError::Service("request throttled".to_owned()),
            AwsError::ServiceError(msg)
            | AwsError::NotFound(msg)
            | AwsError::InvalidPayload(msg) => AckError::Service(msg),
        }
    }
}

impl From<AwsError> for CredentialError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::NotFound(msg) => CredentialError::NotFound(msg),
            AwsError::InvalidPayload(msg) => CredentialError::Malformed(msg),
            other => CredentialError::Unavailable(other.to_string()),
        }
    }
}

/// Classify an AWS SDK error string into the appropriate [`AwsError`].
///
/// This helper inspects the error message for common patterns (throttling,
/// timeout, connection, missing resource) and maps them to the correct variant.
pub fn classify_sdk_error(error_str: &str) -> AwsError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        AwsError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsError::Timeout
    } else if lower.contains("resourcenotfound")
        || lower.contains("nonexistentqueue")
        || lower.contains("can't find")
    {
        AwsError::NotFound(error_str.to_owned())
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
        || lower.contains("dispatch failure")
    {
        AwsError::Connection(error_str.to_owned())
    } else {
        AwsError::ServiceError(error_str.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_maps_to_ack_connection() {
        let err: AckError = AwsError::Connection("reset".into()).into();
        assert!(matches!(err, AckError::Connection(_)));
    }

    #[test]
    fn timeout_maps_to_ack_connection() {
        let err: AckError = AwsError::Timeout.into();
        match err {
            AckError::Connection(msg) => assert_eq!(msg, "request timed out"),
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[test]
    fn service_error_maps_to_ack_service() {
        let err: AckError = AwsError::ServiceError("ReceiptHandleIsInvalid".into()).into();
        assert!(matches!(err, AckError::Service(_)));
    }

    #[test]
    fn not_found_maps_to_credential_not_found() {
        let err: CredentialError = AwsError::NotFound("prod/GitHubCredentials".into()).into();
        assert!(matches!(err, CredentialError::NotFound(_)));
    }

    #[test]
    fn invalid_payload_maps_to_malformed() {
        let err: CredentialError = AwsError::InvalidPayload("not json".into()).into();
        assert!(matches!(err, CredentialError::Malformed(_)));
    }

    #[test]
    fn throttled_maps_to_credential_unavailable() {
        let err: CredentialError = AwsError::Throttled.into();
        assert!(matches!(err, CredentialError::Unavailable(_)));
    }

    #[test]
    fn classify_throttled() {
        let err = classify_sdk_error("ThrottlingException: Rate exceeded");
        assert!(matches!(err, AwsError::Throttled));
    }

    #[test]
    fn classify_timeout() {
        let err = classify_sdk_error("Request timed out after 30s");
        assert!(matches!(err, AwsError::Timeout));
    }

    #[test]
    fn classify_not_found() {
        let err = classify_sdk_error(
            "ResourceNotFoundException: Secrets Manager can't find the specified secret.",
        );
        assert!(matches!(err, AwsError::NotFound(_)));
    }

    #[test]
    fn classify_connection() {
        let err = classify_sdk_error("dispatch failure: Connection refused: localhost:4566");
        assert!(matches!(err, AwsError::Connection(_)));
    }

    #[test]
    fn classify_generic_service_error() {
        let err = classify_sdk_error("ReceiptHandleIsInvalid: The input receipt handle is invalid");
        assert!(matches!(err, AwsError::ServiceError(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(AwsError::Throttled.to_string(), "AWS request throttled");
        assert_eq!(AwsError::Timeout.to_string(), "AWS request timed out");
        assert_eq!(
            AwsError::ServiceError("bad".into()).to_string(),
            "AWS service error: bad"
        );
    }
}
