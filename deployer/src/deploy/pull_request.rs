//! Pull request creation at the end of first-time provisioning

use api_models::models::github::{PullRequest, PullRequestCreate};
use tracing::{info, warn};

use crate::clients::{CodeHost, Shell};
use crate::errors::DeployError;
use crate::vcs::git;

/// Outcome of the pull request step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Created(PullRequest),
    AlreadyExists,
}

/// Pushes a branch to the canonical remote and opens a pull request for it
pub struct PullRequestStep<'a> {
    pub code_host: &'a dyn CodeHost,
    pub shell: &'a dyn Shell,
    pub repository: &'a str,
    pub canonical_remote: &'a str,
    pub base_branch: &'a str,
}

impl PullRequestStep<'_> {
    /// Title is the full app name, body the ticket id (empty when absent).
    ///
    /// An already-open pull request is logged and treated as success.
    pub async fn run(
        &self,
        full_app_name: &str,
        ticket_id: Option<&str>,
        branch_name: &str,
    ) -> Result<PullRequestOutcome, DeployError> {
        info!("Creating Pull Request");
        git::push(self.shell, self.canonical_remote, branch_name, None).await?;

        let request = PullRequestCreate {
            title: full_app_name.to_string(),
            head: branch_name.to_string(),
            base: self.base_branch.to_string(),
            body: ticket_id.unwrap_or_default().to_string(),
        };

        match self
            .code_host
            .create_pull_request(self.repository, &request)
            .await
        {
            Ok(pr) => {
                info!("Opened pull request #{}: {}", pr.number, pr.html_url);
                Ok(PullRequestOutcome::Created(pr))
            }
            Err(DeployError::DuplicateResource(msg)) => {
                warn!("An error occurred when creating the pull request: {}", msg);
                Ok(PullRequestOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }
}
