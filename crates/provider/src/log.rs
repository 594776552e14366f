use seedbomb_core::{Credential, DispatchRequest, DispatchResult};
use tracing::info;

use crate::dispatcher::ActionDispatcher;

/// A dispatcher that logs the request and reports it as accepted without
/// performing any external I/O.
///
/// Useful for local development and dry runs against a real queue where no
/// workflow should actually be triggered.
pub struct LogDispatcher {
    name: String,
}

impl LogDispatcher {
    /// Create a new `LogDispatcher` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ActionDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[allow(clippy::unused_async)]
    async fn dispatch(&self, request: &DispatchRequest, _credential: &Credential) -> DispatchResult {
        info!(
            dispatcher = %self.name,
            owner = %request.owner,
            repo = %request.repo,
            workflow_id = %request.workflow_id,
            ref_name = %request.ref_name,
            inputs = ?request.inputs,
            "log dispatcher accepted workflow dispatch"
        );
        DispatchResult::Accepted
    }
}
