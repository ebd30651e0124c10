//! Deployment orchestrator
//!
//! Decides between the create and update sequences from a single existence
//! check, then drives every collaborator through the ordered steps. Steps
//! are not rolled back on failure; every step is idempotent or additive, so
//! re-running `deploy` after fixing the cause resumes safely.

use std::future::Future;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::clients::Clients;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
use crate::deploy::pull_request::{PullRequestOutcome, PullRequestStep};
use crate::deploy::step::Step;
use crate::deploy::waiter::{self, ProcessWaiter};
use crate::errors::DeployError;
use crate::naming::resolver::{self, DeploymentRequest, NameOverrides};
use crate::naming::slug::rewrite_git_host;
use crate::storage::settings::Settings;
use crate::vcs::git;

/// Environment variable carrying the app's subdomain
pub const SUBDOMAIN_VAR: &str = "APP_SUBDOMAIN";

const UPDATED_NOTE: &str = "A new version has just been deployed";

/// Which sequence a deploy ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPath {
    Created,
    Updated,
}

/// Summary of a finished deploy
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub request: DeploymentRequest,
    pub path: DeployPath,
    pub url: String,
    /// Steps that ran, in order
    pub steps: Vec<Step>,
    pub pull_request: Option<PullRequestOutcome>,
}

/// Summary of a finished undeploy
#[derive(Debug, Clone)]
pub struct UndeployReport {
    pub request: DeploymentRequest,
    pub steps: Vec<Step>,
}

/// Drives deploy and undeploy runs against the injected collaborators
pub struct Deployer<'a> {
    settings: &'a Settings,
    clients: Clients,
    waiter: ProcessWaiter,
    fsm: RwLock<DeploymentFsm>,
    executed: RwLock<Vec<Step>>,
}

impl<'a> Deployer<'a> {
    /// `cancel` aborts waits on remote processes when it flips to `true`
    pub fn new(settings: &'a Settings, clients: Clients, cancel: watch::Receiver<bool>) -> Self {
        let waiter = ProcessWaiter::new(waiter::Options::from(&settings.wait), cancel);
        Self {
            settings,
            clients,
            waiter,
            fsm: RwLock::new(DeploymentFsm::new()),
            executed: RwLock::new(Vec::new()),
        }
    }

    /// Get the current state
    pub async fn state(&self) -> DeploymentState {
        self.fsm.read().await.state().clone()
    }

    /// Every state the last run went through
    pub async fn history(&self) -> Vec<DeploymentState> {
        self.fsm.read().await.history().to_vec()
    }

    // ================================ RUNS ================================== //

    /// Create the branch's app, or update it when it already exists
    pub async fn deploy(&self, overrides: &NameOverrides) -> Result<DeployReport, DeployError> {
        let request = self.begin(overrides).await?;
        info!("Deploying {} ({})", request.full_app_name, request.branch_name);

        let exists = self
            .step(Step::CheckExistence, self.app_exists(&request))
            .await?;

        let (path, pull_request) = if exists {
            self.transition(DeploymentEvent::AppFound).await?;
            self.update(&request).await?;
            self.transition(DeploymentEvent::Provisioned).await?;
            (DeployPath::Updated, None)
        } else {
            self.transition(DeploymentEvent::AppMissing).await?;
            self.create(&request).await?;
            self.transition(DeploymentEvent::Provisioned).await?;

            self.transition(DeploymentEvent::PullRequestRequested)
                .await?;
            let outcome = self
                .step(Step::CreatePullRequest, self.create_pull_request(&request))
                .await?;
            (DeployPath::Created, Some(outcome))
        };

        self.transition(DeploymentEvent::Completed).await?;

        let url = self.url(&request);
        self.open(&url).await;

        Ok(DeployReport {
            request,
            path,
            url,
            steps: self.executed.read().await.clone(),
            pull_request,
        })
    }

    /// Delete the branch's app, its DNS records and its local git remote
    pub async fn undeploy(&self, overrides: &NameOverrides) -> Result<UndeployReport, DeployError> {
        let request = self.begin(overrides).await?;
        info!("Undeploying {}", request.full_app_name);

        // Remote first: a failure leaves the local remote for a manual retry
        self.step(Step::DeleteApp, self.delete_app(&request)).await?;
        self.step(Step::RemoveDnsRecords, self.remove_dns_records(&request))
            .await?;
        self.step(Step::RemoveGitRemote, self.remove_git_remote(&request))
            .await?;

        self.transition(DeploymentEvent::Completed).await?;

        Ok(UndeployReport {
            request,
            steps: self.executed.read().await.clone(),
        })
    }

    async fn begin(&self, overrides: &NameOverrides) -> Result<DeploymentRequest, DeployError> {
        *self.fsm.write().await = DeploymentFsm::new();
        self.executed.write().await.clear();

        let request = self
            .step(
                Step::ResolveIdentity,
                resolver::resolve(
                    self.clients.shell.as_ref(),
                    &self.settings.namespace,
                    overrides,
                ),
            )
            .await?;
        self.transition(DeploymentEvent::Resolved).await?;
        Ok(request)
    }

    async fn update(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        self.step(Step::SetEnvironment, self.set_environment(request))
            .await?;
        self.step(Step::AddCollaborators, self.add_collaborators(request))
            .await?;
        self.step(Step::PushCode, self.push_code(request)).await?;
        self.step(Step::MigrateDatabase, self.migrate_database(request))
            .await?;
        if request.ticket_id.is_some() {
            self.step(
                Step::NotifyTracker,
                self.notify_tracker(request, UPDATED_NOTE.to_string()),
            )
            .await?;
        }
        Ok(())
    }

    async fn create(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        self.step(Step::CreateApp, self.create_app(request)).await?;
        self.step(Step::AddCollaborators, self.add_collaborators(request))
            .await?;
        self.step(Step::AddAddons, self.add_addons(request)).await?;

        if let Some(domain) = self.settings.domain.as_deref() {
            self.step(Step::CreateDnsRecords, self.create_dns_records(request, domain))
                .await?;
            self.step(Step::AddCustomDomains, self.add_custom_domains(request, domain))
                .await?;
        } else {
            debug!("No custom domain configured, skipping DNS records and domain aliases");
        }

        self.step(Step::SetEnvironment, self.set_environment(request))
            .await?;
        self.step(Step::PushCode, self.push_code(request)).await?;
        self.step(Step::SetupDatabase, self.setup_database(request))
            .await?;

        if request.ticket_id.is_some() {
            let note = format!("Test at: {}", self.url(request));
            self.step(Step::NotifyTracker, self.notify_tracker(request, note))
                .await?;
        }
        Ok(())
    }

    /// Run one step, recording it and marking the run failed on error
    async fn step<T, F>(&self, step: Step, fut: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, DeployError>>,
    {
        match fut.await {
            Ok(value) => {
                self.executed.write().await.push(step);
                Ok(value)
            }
            Err(e) => {
                // The run is already failing; a rejected transition adds nothing
                let _ = self
                    .fsm
                    .write()
                    .await
                    .process(DeploymentEvent::StepFailed(step));
                Err(e.in_step(step))
            }
        }
    }

    async fn transition(&self, event: DeploymentEvent) -> Result<(), DeployError> {
        self.fsm
            .write()
            .await
            .process(event)
            .map_err(DeployError::InvalidTransition)
    }

    fn url(&self, request: &DeploymentRequest) -> String {
        request.url(
            self.settings.domain.as_deref(),
            &self.settings.platform.app_domain,
        )
    }

    // ================================ STEPS ================================= //

    async fn app_exists(&self, request: &DeploymentRequest) -> Result<bool, DeployError> {
        let apps = self.clients.platform.list_apps().await?;
        let exists = apps.iter().any(|name| name == &request.full_app_name);
        debug!("App {} exists: {}", request.full_app_name, exists);
        Ok(exists)
    }

    async fn create_app(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Creating App {}", request.full_app_name);
        let git_url = self
            .clients
            .platform
            .create_app(&request.full_app_name, self.settings.region.as_deref())
            .await?;

        let remote_url = match self.settings.account_name.as_deref() {
            Some(account) => rewrite_git_host(&git_url, account),
            None => git_url,
        };
        git::set_remote(self.clients.shell.as_ref(), &request.remote_name, &remote_url).await
    }

    async fn add_collaborators(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Adding collaborators");
        for collaborator in &self.settings.collaborators {
            match self
                .clients
                .platform
                .add_collaborator(&request.full_app_name, collaborator)
                .await
            {
                Err(DeployError::DuplicateResource(msg)) => debug!("{}", msg),
                other => other?,
            }
        }
        Ok(())
    }

    async fn add_addons(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Adding addons");
        for addon in &self.settings.addons {
            info!("Adding {}", addon);
            self.clients
                .platform
                .add_addon(&request.full_app_name, addon)
                .await?;
        }
        Ok(())
    }

    async fn create_dns_records(
        &self,
        request: &DeploymentRequest,
        domain: &str,
    ) -> Result<(), DeployError> {
        info!("Adding DNS records to {}", domain);
        let zone = self.clients.dns.find_zone(domain).await?;
        let target = request.platform_hostname(&self.settings.platform.app_domain);

        for name in request.dns_record_names() {
            self.clients
                .dns
                .create_record(&zone, &name, "CNAME", &target)
                .await?;
        }
        Ok(())
    }

    async fn add_custom_domains(
        &self,
        request: &DeploymentRequest,
        domain: &str,
    ) -> Result<(), DeployError> {
        info!("Adding custom domain");
        for hostname in request.custom_hostnames(domain) {
            self.clients
                .platform
                .add_domain(&request.full_app_name, &hostname)
                .await?;
        }
        Ok(())
    }

    async fn set_environment(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Adding environment variables");
        let mut vars = self.settings.env_vars.clone();
        vars.insert(SUBDOMAIN_VAR.to_string(), request.app_name.clone());

        self.clients
            .platform
            .set_config_vars(&request.full_app_name, &vars)
            .await
    }

    async fn push_code(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Pushing {} to {}", request.branch_name, request.remote_name);
        git::push(
            self.clients.shell.as_ref(),
            &request.remote_name,
            &request.branch_name,
            Some(&self.settings.git.deploy_branch),
        )
        .await
    }

    async fn setup_database(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        let database = &self.settings.database;

        info!("Creating and migrating the database");
        self.run_and_wait(request, database.initial_command())
            .await?;

        if let Some(seed) = database.seed_command.as_deref() {
            info!("Seeding the database");
            self.run_and_wait(request, seed).await?;
        }
        Ok(())
    }

    async fn migrate_database(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Migrating database");
        self.clients
            .platform
            .start_process(&request.full_app_name, &self.settings.database.migrate_command)
            .await
    }

    async fn run_and_wait(&self, request: &DeploymentRequest, command: &str) -> Result<(), DeployError> {
        let platform = self.clients.platform.as_ref();
        platform
            .start_process(&request.full_app_name, command)
            .await?;
        self.waiter
            .wait(platform, &request.full_app_name, command)
            .await
    }

    async fn notify_tracker(&self, request: &DeploymentRequest, note: String) -> Result<(), DeployError> {
        let Some(ticket_id) = request.ticket_id.as_deref() else {
            return Ok(());
        };
        let project_id = self.settings.tracker.project_id.as_deref().ok_or_else(|| {
            DeployError::ConfigError("tracker.project_id is not configured".to_string())
        })?;

        let tracker = self.clients.tracker.as_ref();
        let project = tracker.find_project(project_id).await?;
        let Some(story) = tracker.find_story(&project, ticket_id).await? else {
            warn!("Story {} not found in project {}, skipping note", ticket_id, project.name);
            return Ok(());
        };

        info!("Adding note to story {}", story.id);
        tracker.create_note(&story, &note).await?;
        tracker
            .update_story_state(&story, &self.settings.tracker.delivered_state)
            .await
    }

    async fn create_pull_request(
        &self,
        request: &DeploymentRequest,
    ) -> Result<PullRequestOutcome, DeployError> {
        let code_host = &self.settings.code_host;
        let repository = code_host.repository.as_deref().ok_or_else(|| {
            DeployError::ConfigError("code_host.repository is not configured".to_string())
        })?;

        PullRequestStep {
            code_host: self.clients.code_host.as_ref(),
            shell: self.clients.shell.as_ref(),
            repository,
            canonical_remote: &self.settings.git.canonical_remote,
            base_branch: &code_host.base_branch,
        }
        .run(
            &request.full_app_name,
            request.ticket_id.as_deref(),
            &request.branch_name,
        )
        .await
    }

    async fn delete_app(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Deleting App {}", request.full_app_name);
        match self.clients.platform.delete_app(&request.full_app_name).await {
            Err(e) if e.is_not_found() => {
                warn!("App {} was already deleted", request.full_app_name);
                Ok(())
            }
            other => other,
        }
    }

    async fn remove_dns_records(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        let Some(domain) = self.settings.domain.as_deref() else {
            debug!("No custom domain configured, no DNS records to remove");
            return Ok(());
        };

        info!("Removing DNS records from {}", domain);
        let dns = self.clients.dns.as_ref();
        let zone = dns.find_zone(domain).await?;
        let names = request.dns_record_names();

        for record in dns.list_records(&zone).await? {
            if names.contains(&record.name) {
                debug!("Deleting {} record {}", record.record_type, record.name);
                dns.delete_record(&zone, &record).await?;
            }
        }
        Ok(())
    }

    async fn remove_git_remote(&self, request: &DeploymentRequest) -> Result<(), DeployError> {
        info!("Removing git remote {}", request.remote_name);
        match git::remove_remote(self.clients.shell.as_ref(), &request.remote_name).await {
            Err(DeployError::Command { command, code }) => {
                warn!("`{}` exited with {:?}; remote may not exist here", command, code);
                Ok(())
            }
            other => other,
        }
    }

    /// Best-effort: failing to open a browser does not fail the deploy
    async fn open(&self, url: &str) {
        if !self.settings.open_browser {
            info!("Deployed to {}", url);
            return;
        }
        if let Err(e) = git::open_url(self.clients.shell.as_ref(), url).await {
            warn!("Could not open {}: {}", url, e);
        }
    }
}
