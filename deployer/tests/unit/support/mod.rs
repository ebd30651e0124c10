//! Recording test doubles for every collaborator trait

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use api_models::models::dnsimple::{Record, Zone};
use api_models::models::github::{PullRequest, PullRequestCreate};
use api_models::models::tracker::{Project, Story};
use async_trait::async_trait;
use branchdeploy::clients::{Clients, CodeHost, DnsRegistrar, HostingPlatform, IssueTracker, Shell};
use branchdeploy::errors::DeployError;
use branchdeploy::storage::settings::Settings;
use secrecy::SecretString;

/// Shared, ordered call log
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Events without process polling noise
    pub fn calls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| !e.starts_with("platform.list_processes"))
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.events().iter().position(|e| e.starts_with(prefix))
    }
}

fn server_error(service: &'static str) -> DeployError {
    DeployError::Api {
        service,
        status: 500,
        body: "boom".to_string(),
    }
}

// ============================== PLATFORM ================================= //

pub struct FakePlatform {
    log: Recorder,
    pub apps: Mutex<Vec<String>>,
    /// (command, polls left before it disappears)
    running: Mutex<Vec<(String, usize)>>,
    pub polls_per_process: usize,
    pub always_running: bool,
    pub fail_on: Option<&'static str>,
    pub delete_not_found: bool,
    /// Identities that already have access to every app
    pub existing_collaborators: Vec<String>,
}

impl FakePlatform {
    pub fn new(log: Recorder) -> Self {
        Self {
            log,
            apps: Mutex::new(vec!["acme-unrelated".to_string()]),
            running: Mutex::new(Vec::new()),
            polls_per_process: 1,
            always_running: false,
            fail_on: None,
            delete_not_found: false,
            existing_collaborators: Vec::new(),
        }
    }

    fn check(&self, call: &str) -> Result<(), DeployError> {
        if self.fail_on == Some(call) {
            return Err(server_error("heroku"));
        }
        Ok(())
    }
}

#[async_trait]
impl HostingPlatform for FakePlatform {
    async fn list_apps(&self) -> Result<Vec<String>, DeployError> {
        self.log.record("platform.list_apps");
        self.check("list_apps")?;
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn create_app(&self, name: &str, region: Option<&str>) -> Result<String, DeployError> {
        match region {
            Some(region) => self.log.record(format!("platform.create_app {} region={}", name, region)),
            None => self.log.record(format!("platform.create_app {}", name)),
        }
        self.check("create_app")?;
        self.apps.lock().unwrap().push(name.to_string());
        Ok(format!("https://git.heroku.com/{}.git", name))
    }

    async fn delete_app(&self, name: &str) -> Result<(), DeployError> {
        self.log.record(format!("platform.delete_app {}", name));
        self.check("delete_app")?;
        if self.delete_not_found {
            return Err(DeployError::Api {
                service: "heroku",
                status: 404,
                body: "not found".to_string(),
            });
        }
        self.apps.lock().unwrap().retain(|a| a != name);
        Ok(())
    }

    async fn list_processes(&self, app: &str) -> Result<Vec<String>, DeployError> {
        self.log.record(format!("platform.list_processes {}", app));
        let mut running = self.running.lock().unwrap();
        let commands = running.iter().map(|(c, _)| c.clone()).collect();
        if !self.always_running {
            for entry in running.iter_mut() {
                entry.1 = entry.1.saturating_sub(1);
            }
            running.retain(|(_, left)| *left > 0);
        }
        Ok(commands)
    }

    async fn start_process(&self, app: &str, command: &str) -> Result<(), DeployError> {
        self.log.record(format!("platform.start_process {} {}", app, command));
        self.check("start_process")?;
        if self.polls_per_process > 0 || self.always_running {
            self.running
                .lock()
                .unwrap()
                .push((command.to_uppercase(), self.polls_per_process));
        }
        Ok(())
    }

    async fn set_config_vars(
        &self,
        app: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), DeployError> {
        let pairs: Vec<String> = vars.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.log
            .record(format!("platform.set_config_vars {} {}", app, pairs.join(",")));
        self.check("set_config_vars")
    }

    async fn add_collaborator(&self, app: &str, identifier: &str) -> Result<(), DeployError> {
        self.log
            .record(format!("platform.add_collaborator {} {}", app, identifier));
        self.check("add_collaborator")?;
        if self.existing_collaborators.iter().any(|c| c == identifier) {
            return Err(DeployError::DuplicateResource(format!(
                "{} is already a collaborator on {}",
                identifier, app
            )));
        }
        Ok(())
    }

    async fn add_domain(&self, app: &str, hostname: &str) -> Result<(), DeployError> {
        self.log.record(format!("platform.add_domain {} {}", app, hostname));
        self.check("add_domain")
    }

    async fn add_addon(&self, app: &str, addon: &str) -> Result<(), DeployError> {
        self.log.record(format!("platform.add_addon {} {}", app, addon));
        self.check("add_addon")
    }
}

// ================================= DNS =================================== //

pub struct FakeDns {
    log: Recorder,
    pub records: Mutex<Vec<Record>>,
}

impl FakeDns {
    pub fn new(log: Recorder) -> Self {
        Self {
            log,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn seed(&self, name: &str) {
        let mut records = self.records.lock().unwrap();
        let id = records.len() as u64 + 1;
        records.push(Record {
            id,
            zone_id: "example.com".to_string(),
            name: name.to_string(),
            record_type: "CNAME".to_string(),
            content: "somewhere.herokuapp.com".to_string(),
        });
    }

    pub fn names(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
impl DnsRegistrar for FakeDns {
    async fn find_zone(&self, domain: &str) -> Result<Zone, DeployError> {
        self.log.record(format!("dns.find_zone {}", domain));
        Ok(Zone {
            id: 1,
            name: domain.to_string(),
        })
    }

    async fn create_record(
        &self,
        zone: &Zone,
        name: &str,
        record_type: &str,
        content: &str,
    ) -> Result<Record, DeployError> {
        self.log.record(format!(
            "dns.create_record {} {} {} {}",
            zone.name, name, record_type, content
        ));
        self.seed(name);
        let records = self.records.lock().unwrap();
        Ok(records[records.len() - 1].clone())
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, DeployError> {
        self.log.record(format!("dns.list_records {}", zone.name));
        Ok(self.records.lock().unwrap().clone())
    }

    async fn delete_record(&self, zone: &Zone, record: &Record) -> Result<(), DeployError> {
        self.log
            .record(format!("dns.delete_record {} {}", zone.name, record.name));
        self.records.lock().unwrap().retain(|r| r.id != record.id);
        Ok(())
    }
}

// =============================== TRACKER ================================= //

pub struct FakeTracker {
    log: Recorder,
    pub known_stories: Vec<u64>,
}

impl FakeTracker {
    pub fn new(log: Recorder) -> Self {
        Self {
            log,
            known_stories: vec![12345],
        }
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn find_project(&self, project_id: &str) -> Result<Project, DeployError> {
        self.log.record(format!("tracker.find_project {}", project_id));
        Ok(Project {
            id: project_id.parse().unwrap_or_default(),
            name: "Acme".to_string(),
        })
    }

    async fn find_story(
        &self,
        project: &Project,
        ticket_id: &str,
    ) -> Result<Option<Story>, DeployError> {
        self.log.record(format!("tracker.find_story {}", ticket_id));
        let id: u64 = ticket_id.parse().unwrap_or_default();
        Ok(self.known_stories.contains(&id).then(|| Story {
            id,
            project_id: project.id,
            name: "Add search".to_string(),
            current_state: Some("finished".to_string()),
            url: None,
        }))
    }

    async fn create_note(&self, story: &Story, text: &str) -> Result<(), DeployError> {
        self.log
            .record(format!("tracker.create_note {} {}", story.id, text));
        Ok(())
    }

    async fn update_story_state(&self, story: &Story, state: &str) -> Result<(), DeployError> {
        self.log
            .record(format!("tracker.update_story_state {} {}", story.id, state));
        Ok(())
    }
}

// ============================== CODE HOST ================================ //

pub struct FakeCodeHost {
    log: Recorder,
    pub duplicate: bool,
    pub fail: bool,
}

impl FakeCodeHost {
    pub fn new(log: Recorder) -> Self {
        Self {
            log,
            duplicate: false,
            fail: false,
        }
    }
}

#[async_trait]
impl CodeHost for FakeCodeHost {
    async fn create_pull_request(
        &self,
        repository: &str,
        request: &PullRequestCreate,
    ) -> Result<PullRequest, DeployError> {
        self.log.record(format!(
            "code_host.create_pull_request {} {}<-{} title={} body={}",
            repository, request.base, request.head, request.title, request.body
        ));
        if self.duplicate {
            return Err(DeployError::DuplicateResource(format!(
                "pull request for {} already exists",
                request.head
            )));
        }
        if self.fail {
            return Err(server_error("github"));
        }
        Ok(PullRequest {
            number: 7,
            html_url: format!("https://github.com/{}/pull/7", repository),
        })
    }
}

// ================================ SHELL ================================== //

pub struct FakeShell {
    log: Recorder,
    pub branch: Option<String>,
    /// Commands starting with one of these exit non-zero
    pub failing: Vec<String>,
}

impl FakeShell {
    pub fn new(log: Recorder, branch: Option<&str>) -> Self {
        Self {
            log,
            branch: branch.map(str::to_string),
            failing: Vec::new(),
        }
    }
}

#[async_trait]
impl Shell for FakeShell {
    async fn current_branch(&self) -> Result<Option<String>, DeployError> {
        self.log.record("shell.current_branch");
        Ok(self.branch.clone())
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<(), DeployError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.log.record(format!("shell {}", command));

        if self.failing.iter().any(|f| command.starts_with(f.as_str())) {
            return Err(DeployError::Command {
                command,
                code: Some(1),
            });
        }
        Ok(())
    }
}

// =============================== HARNESS ================================= //

/// Every double sharing one recorder
pub struct Harness {
    pub log: Recorder,
    pub platform: FakePlatform,
    pub dns: FakeDns,
    pub tracker: FakeTracker,
    pub code_host: FakeCodeHost,
    pub shell: FakeShell,
}

impl Harness {
    pub fn new(branch: Option<&str>) -> Self {
        let log = Recorder::default();
        Self {
            platform: FakePlatform::new(log.clone()),
            dns: FakeDns::new(log.clone()),
            tracker: FakeTracker::new(log.clone()),
            code_host: FakeCodeHost::new(log.clone()),
            shell: FakeShell::new(log.clone(), branch),
            log,
        }
    }

    /// Freeze the doubles into injectable clients
    pub fn into_clients(self) -> (Recorder, Arc<FakePlatform>, Arc<FakeDns>, Clients) {
        let platform = Arc::new(self.platform);
        let dns = Arc::new(self.dns);
        let clients = Clients {
            platform: platform.clone(),
            dns: dns.clone(),
            tracker: Arc::new(self.tracker),
            code_host: Arc::new(self.code_host),
            shell: Arc::new(self.shell),
        };
        (self.log, platform, dns, clients)
    }
}

/// Settings for namespace `acme` with a custom domain and a tracker project
pub fn settings() -> Settings {
    let mut settings = Settings {
        namespace: "acme".to_string(),
        domain: Some("example.com".to_string()),
        collaborators: vec!["dev@acme.io".to_string()],
        addons: vec!["heroku-postgresql".to_string(), "heroku-redis".to_string()],
        ..Default::default()
    };
    settings
        .env_vars
        .insert("RAILS_ENV".to_string(), "review".to_string());
    settings.platform.api_key = Some(SecretString::from("test-key".to_string()));
    settings.tracker.project_id = Some("99".to_string());
    settings.code_host.repository = Some("acme/web".to_string());
    settings
}
