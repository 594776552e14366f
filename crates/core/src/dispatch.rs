use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A workflow-dispatch call to make against the downstream automation host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Workflow id or workflow file name (e.g. `terraform.yml`).
    pub workflow_id: String,
    /// Branch or tag the workflow runs on.
    pub ref_name: String,
    /// Workflow inputs.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

impl DispatchRequest {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        workflow_id: impl Into<String>,
        ref_name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflow_id: workflow_id.into(),
            ref_name: ref_name.into(),
            inputs: BTreeMap::new(),
        }
    }

    /// Add a workflow input.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }
}

/// Classified result of a single dispatch attempt.
///
/// A rejection is a result, not an error: the dispatcher reports what the
/// endpoint said and leaves the policy to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchResult {
    /// The endpoint accepted the dispatch (HTTP 204).
    Accepted,
    /// The endpoint answered with any other status.
    Rejected { status: u16, body: String },
    /// The request never produced a response (connect error, timeout, ...).
    TransportFailure { cause: String },
}

impl DispatchResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected { status, .. } => write!(f, "rejected (HTTP {status})"),
            Self::TransportFailure { cause } => write!(f, "transport failure: {cause}"),
        }
    }
}
