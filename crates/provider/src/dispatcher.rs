use async_trait::async_trait;

use seedbomb_core::{Credential, DispatchRequest, DispatchResult};

/// Strongly-typed dispatcher trait with native `async fn`.
///
/// A dispatcher makes exactly one side-effecting attempt per call and never
/// retries internally. Every outcome, including transport failures, is
/// reported as a [`DispatchResult`]; the caller owns the failure policy.
///
/// This trait is **not** object-safe because it uses native `async fn` methods
/// (which desugar to opaque `impl Future` return types). If you need dynamic
/// dispatch, use [`DynActionDispatcher`] instead -- every `ActionDispatcher`
/// automatically implements `DynActionDispatcher` via a blanket implementation.
pub trait ActionDispatcher: Send + Sync {
    /// Returns the name of this dispatcher, used in logs.
    fn name(&self) -> &str;

    /// Trigger the downstream action described by `request`.
    fn dispatch(
        &self,
        request: &DispatchRequest,
        credential: &Credential,
    ) -> impl std::future::Future<Output = DispatchResult> + Send;
}

/// Object-safe dispatcher trait for use behind `Arc<dyn DynActionDispatcher>`.
///
/// You generally should not implement this trait directly -- instead implement
/// [`ActionDispatcher`] and rely on the blanket implementation.
#[async_trait]
pub trait DynActionDispatcher: Send + Sync {
    /// Returns the name of this dispatcher, used in logs.
    fn name(&self) -> &str;

    /// Trigger the downstream action described by `request`.
    async fn dispatch(&self, request: &DispatchRequest, credential: &Credential)
    -> DispatchResult;
}

/// Blanket implementation: any type that implements [`ActionDispatcher`] also
/// implements [`DynActionDispatcher`], bridging the static and dynamic dispatch
/// worlds.
#[async_trait]
impl<T: ActionDispatcher + Sync> DynActionDispatcher for T {
    fn name(&self) -> &str {
        ActionDispatcher::name(self)
    }

    async fn dispatch(
        &self,
        request: &DispatchRequest,
        credential: &Credential,
    ) -> DispatchResult {
        ActionDispatcher::dispatch(self, request, credential).await
    }
}
