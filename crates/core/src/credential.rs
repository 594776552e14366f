use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Bearer credential for the downstream dispatch endpoint.
///
/// Lives for a single processing attempt. The token is held as a
/// [`SecretString`] so it is zeroized on drop and redacted from `Debug`.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    fetched_at: DateTime<Utc>,
}

impl Credential {
    /// Wrap a freshly fetched token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            fetched_at: Utc::now(),
        }
    }

    /// The cleartext token. Only the dispatcher should call this.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// When the token was read from the secret store.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let cred = Credential::new("ghp_supersecret");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("ghp_supersecret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn token_is_exposed_on_request() {
        let cred = Credential::new("tok");
        assert_eq!(cred.token(), "tok");
        assert!(cred.fetched_at() <= Utc::now());
    }
}
