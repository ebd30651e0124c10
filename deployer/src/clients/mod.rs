//! Capability interfaces for the systems a deployment touches
//!
//! Every remote system is reached only through these traits. The concrete
//! adapters live in [`crate::http`] and [`crate::vcs`]; tests substitute
//! recording doubles.

use std::collections::BTreeMap;
use std::sync::Arc;

use api_models::models::dnsimple::{Record, Zone};
use api_models::models::github::{PullRequest, PullRequestCreate};
use api_models::models::tracker::{Project, Story};
use async_trait::async_trait;

use crate::errors::DeployError;

/// Hosting platform: app registry, processes, config and attachments
#[async_trait]
pub trait HostingPlatform: Send + Sync {
    /// Names of every app visible to the configured account
    async fn list_apps(&self) -> Result<Vec<String>, DeployError>;

    /// Create an app and return its git push endpoint
    async fn create_app(&self, name: &str, region: Option<&str>) -> Result<String, DeployError>;

    async fn delete_app(&self, name: &str) -> Result<(), DeployError>;

    /// Commands of the processes currently running for an app
    async fn list_processes(&self, app: &str) -> Result<Vec<String>, DeployError>;

    /// Start a one-off process running `command`
    async fn start_process(&self, app: &str, command: &str) -> Result<(), DeployError>;

    async fn set_config_vars(
        &self,
        app: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), DeployError>;

    /// Grant access; an identity that already has it is [`DeployError::DuplicateResource`]
    async fn add_collaborator(&self, app: &str, identifier: &str) -> Result<(), DeployError>;

    async fn add_domain(&self, app: &str, hostname: &str) -> Result<(), DeployError>;

    async fn add_addon(&self, app: &str, addon: &str) -> Result<(), DeployError>;
}

/// DNS registrar: zones and records
#[async_trait]
pub trait DnsRegistrar: Send + Sync {
    async fn find_zone(&self, domain: &str) -> Result<Zone, DeployError>;

    async fn create_record(
        &self,
        zone: &Zone,
        name: &str,
        record_type: &str,
        content: &str,
    ) -> Result<Record, DeployError>;

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, DeployError>;

    async fn delete_record(&self, zone: &Zone, record: &Record) -> Result<(), DeployError>;
}

/// Issue tracker: stories, notes and state
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn find_project(&self, project_id: &str) -> Result<Project, DeployError>;

    /// Look up a story; `None` when the tracker does not know the id
    async fn find_story(
        &self,
        project: &Project,
        ticket_id: &str,
    ) -> Result<Option<Story>, DeployError>;

    async fn create_note(&self, story: &Story, text: &str) -> Result<(), DeployError>;

    async fn update_story_state(&self, story: &Story, state: &str) -> Result<(), DeployError>;
}

/// Code host: pull requests.
///
/// An already-open pull request for the same head must be reported as
/// [`DeployError::DuplicateResource`].
#[async_trait]
pub trait CodeHost: Send + Sync {
    async fn create_pull_request(
        &self,
        repository: &str,
        request: &PullRequestCreate,
    ) -> Result<PullRequest, DeployError>;
}

/// Local shell and version control
#[async_trait]
pub trait Shell: Send + Sync {
    /// Name of the checked-out branch, `None` when detached or outside a repository
    async fn current_branch(&self) -> Result<Option<String>, DeployError>;

    /// Run `program` with `args` to completion; non-zero exit is an error
    async fn run(&self, program: &str, args: &[&str]) -> Result<(), DeployError>;
}

/// The set of collaborators injected into the orchestrator
#[derive(Clone)]
pub struct Clients {
    pub platform: Arc<dyn HostingPlatform>,
    pub dns: Arc<dyn DnsRegistrar>,
    pub tracker: Arc<dyn IssueTracker>,
    pub code_host: Arc<dyn CodeHost>,
    pub shell: Arc<dyn Shell>,
}
