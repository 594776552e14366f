use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use seedbomb_core::{Credential, DispatchRequest, DispatchResult};
use seedbomb_provider::ActionDispatcher;
use tracing::{debug, instrument, warn};

use crate::config::GitHubConfig;
use crate::error::GitHubError;

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Triggers GitHub Actions workflows through the workflow-dispatch API.
///
/// Each call sends exactly one `POST`; there is no retry. HTTP 204 maps to
/// [`DispatchResult::Accepted`], every other status to
/// [`DispatchResult::Rejected`] with the response body, and any error that
/// prevents a response to [`DispatchResult::TransportFailure`].
pub struct GitHubWorkflowDispatcher {
    dispatcher_name: String,
    config: GitHubConfig,
    client: Client,
}

impl std::fmt::Debug for GitHubWorkflowDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubWorkflowDispatcher")
            .field("name", &self.dispatcher_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GitHubWorkflowDispatcher {
    /// Create a dispatcher with a `reqwest::Client` using the configured
    /// timeout. Redirects are never followed: a 3xx is reported as
    /// [`DispatchResult::Rejected`].
    pub fn new(name: impl Into<String>, config: GitHubConfig) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(Policy::none())
            .build()
            .map_err(|e| GitHubError::Configuration(e.to_string()))?;

        Ok(Self::with_client(name, config, client))
    }

    /// Create a dispatcher with a custom HTTP client.
    ///
    /// The client should be built with `redirect(Policy::none())`; a client
    /// that follows redirects re-sends the dispatch to the `Location` target.
    pub fn with_client(name: impl Into<String>, config: GitHubConfig, client: Client) -> Self {
        Self {
            dispatcher_name: name.into(),
            config,
            client,
        }
    }

    fn build_body(request: &DispatchRequest) -> serde_json::Value {
        serde_json::json!({
            "ref": request.ref_name,
            "inputs": request.inputs,
        })
    }

    async fn send(
        &self,
        request: &DispatchRequest,
        credential: &Credential,
    ) -> Result<DispatchResult, GitHubError> {
        let url = self
            .config
            .dispatch_url(&request.owner, &request.repo, &request.workflow_id);
        let body = Self::build_body(request);

        debug!(url = %url, "sending workflow dispatch");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, &self.config.accept)
            .header(USER_AGENT, &self.config.user_agent)
            .header(API_VERSION_HEADER, &self.config.api_version)
            .bearer_auth(credential.token())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 204 {
            return Ok(DispatchResult::Accepted);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status, body = %body, "workflow dispatch rejected");
        Ok(DispatchResult::Rejected { status, body })
    }
}

impl ActionDispatcher for GitHubWorkflowDispatcher {
    fn name(&self) -> &str {
        &self.dispatcher_name
    }

    #[instrument(
        skip(self, request, credential),
        fields(
            dispatcher = %self.dispatcher_name,
            owner = %request.owner,
            repo = %request.repo,
            workflow_id = %request.workflow_id,
        )
    )]
    async fn dispatch(&self, request: &DispatchRequest, credential: &Credential) -> DispatchResult {
        match self.send(request, credential).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "workflow dispatch transport failure");
                err.into()
            }
        }
    }
}
