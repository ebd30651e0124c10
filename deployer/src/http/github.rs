//! GitHub pull request adapter

use api_models::models::github::{PullRequest, PullRequestCreate, ValidationFailed};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::clients::CodeHost;
use crate::errors::DeployError;
use crate::http::client::{AuthStyle, HttpClient};

/// Code host backed by the GitHub REST API
pub struct GitHubClient {
    http: HttpClient,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self, DeployError> {
        let http = HttpClient::new(
            "github",
            base_url,
            token,
            AuthStyle::Bearer,
            &[("accept", "application/vnd.github+json")],
        )?;
        Ok(Self { http })
    }
}

/// Whether a 422 body reports an already-open pull request
pub fn is_duplicate_pull_request(body: &str) -> bool {
    serde_json::from_str::<ValidationFailed>(body)
        .map(|v| v.is_duplicate_pull_request())
        .unwrap_or(false)
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn create_pull_request(
        &self,
        repository: &str,
        request: &PullRequestCreate,
    ) -> Result<PullRequest, DeployError> {
        let path = format!("/repos/{}/pulls", repository);
        match self.http.post(&path, request).await {
            Err(DeployError::Api { status: 422, body, .. }) if is_duplicate_pull_request(&body) => {
                Err(DeployError::DuplicateResource(format!(
                    "pull request for {} already exists",
                    request.head
                )))
            }
            other => other,
        }
    }
}
