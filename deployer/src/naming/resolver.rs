//! Deployment identity resolution

use serde::Serialize;
use tracing::debug;

use crate::clients::Shell;
use crate::errors::DeployError;
use crate::naming::slug::{app_slug, remote_slug, ticket_prefix};

/// Caller-supplied overrides. Explicit values beat derived ones.
#[derive(Debug, Clone, Default)]
pub struct NameOverrides {
    pub branch_name: Option<String>,
    pub remote_name: Option<String>,
    pub app_name: Option<String>,
    pub ticket_id: Option<String>,
}

/// Identifiers of one deployment, derived once per invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRequest {
    pub branch_name: String,
    pub remote_name: String,
    pub app_name: String,
    pub full_app_name: String,
    pub ticket_id: Option<String>,
}

impl DeploymentRequest {
    /// Derive every identifier from a known branch name. Pure.
    pub fn from_branch(branch_name: &str, namespace: &str, overrides: &NameOverrides) -> Self {
        let remote_name = overrides
            .remote_name
            .clone()
            .unwrap_or_else(|| remote_slug(branch_name));
        let app_name = overrides
            .app_name
            .clone()
            .unwrap_or_else(|| app_slug(branch_name));
        let full_app_name = format!("{}-{}", namespace, app_name);
        let ticket_id = overrides
            .ticket_id
            .clone()
            .or_else(|| ticket_prefix(branch_name));

        Self {
            branch_name: branch_name.to_string(),
            remote_name,
            app_name,
            full_app_name,
            ticket_id,
        }
    }

    /// Reject identifiers that no remote system would accept
    pub fn check(&self) -> Result<(), DeployError> {
        if self.app_name.is_empty() || self.remote_name.is_empty() {
            return Err(DeployError::InvalidName(format!(
                "branch '{}' has no letters or digits to derive an app name from; pass --app-name and --remote-name",
                self.branch_name
            )));
        }
        Ok(())
    }

    /// Hostname of the app on the platform's default domain
    pub fn platform_hostname(&self, app_domain: &str) -> String {
        format!("{}.{}", self.full_app_name, app_domain)
    }

    /// Apex and wildcard hostnames under a custom domain
    pub fn custom_hostnames(&self, domain: &str) -> [String; 2] {
        [
            format!("{}.{}", self.app_name, domain),
            format!("*.{}.{}", self.app_name, domain),
        ]
    }

    /// Record names of the apex and wildcard entries inside the zone
    pub fn dns_record_names(&self) -> [String; 2] {
        [self.app_name.clone(), format!("*.{}", self.app_name)]
    }

    /// Public URL: the custom domain when configured, else the platform hostname
    pub fn url(&self, domain: Option<&str>, app_domain: &str) -> String {
        match domain {
            Some(domain) => format!("http://{}.{}", self.app_name, domain),
            None => format!("http://{}", self.platform_hostname(app_domain)),
        }
    }
}

/// Resolve the deployment identity, asking the shell for the current branch
/// when no branch override is given.
pub async fn resolve(
    shell: &dyn Shell,
    namespace: &str,
    overrides: &NameOverrides,
) -> Result<DeploymentRequest, DeployError> {
    let branch_name = match overrides.branch_name.as_deref().map(str::trim) {
        Some(branch) if !branch.is_empty() => branch.to_string(),
        _ => shell
            .current_branch()
            .await?
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                DeployError::NoActiveBranch(
                    "could not determine the current branch; pass --branch-name".to_string(),
                )
            })?,
    };

    let request = DeploymentRequest::from_branch(&branch_name, namespace, overrides);
    request.check()?;
    debug!("Resolved deployment identity: {:?}", request);
    Ok(request)
}
