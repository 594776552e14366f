use async_trait::async_trait;

use seedbomb_core::Credential;

use crate::error::CredentialError;

/// Source of the bearer credential used for dispatch.
///
/// Implementations must perform a live lookup on every call. Caching across
/// invocations would delay picking up a rotated secret.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch(&self) -> Result<Credential, CredentialError>;
}
