//! Settings file management

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::naming::slug::app_slug;

/// Deployment settings, loaded once per invocation
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Prefix of every app name (`{namespace}-{app}`)
    #[serde(default)]
    pub namespace: String,

    /// Custom apex domain; the platform's default hostname is used when absent
    #[serde(default)]
    pub domain: Option<String>,

    /// Hosting region, platform default when absent
    #[serde(default)]
    pub region: Option<String>,

    /// Account name substituted into git remote hosts
    #[serde(default)]
    pub account_name: Option<String>,

    /// Environment variables injected into every app
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,

    /// Add-ons provisioned on creation, in order
    #[serde(default)]
    pub addons: Vec<String>,

    /// Identities granted access to every app
    #[serde(default)]
    pub collaborators: Vec<String>,

    /// Open the deployed URL when done
    #[serde(default = "default_true")]
    pub open_browser: bool,

    #[serde(default)]
    pub platform: PlatformSettings,

    #[serde(default)]
    pub dns: DnsSettings,

    #[serde(default)]
    pub tracker: TrackerSettings,

    #[serde(default)]
    pub code_host: CodeHostSettings,

    #[serde(default)]
    pub git: GitSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub wait: WaitSettings,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            namespace: String::new(),
            domain: None,
            region: None,
            account_name: None,
            env_vars: BTreeMap::new(),
            addons: Vec::new(),
            collaborators: Vec::new(),
            open_browser: true,
            platform: PlatformSettings::default(),
            dns: DnsSettings::default(),
            tracker: TrackerSettings::default(),
            code_host: CodeHostSettings::default(),
            git: GitSettings::default(),
            database: DatabaseSettings::default(),
            wait: WaitSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file, then apply environment overrides and validate
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        if !file.exists().await {
            return Err(DeployError::ConfigError(format!(
                "settings file not found: {}",
                file.path().display()
            )));
        }

        let mut settings: Settings = file.read_json().await?;
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        debug!("Loaded settings from {}", file.path().display());
        Ok(settings)
    }

    /// Credentials from the environment win over the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(SecretString::from);

        if let Some(key) = secret("HEROKU_API_KEY") {
            self.platform.api_key = Some(key);
        }
        if let Some(account) = lookup("DNSIMPLE_ACCOUNT_ID").filter(|v| !v.is_empty()) {
            self.dns.account_id = Some(account);
        }
        if let Some(token) = secret("DNSIMPLE_TOKEN") {
            self.dns.api_token = Some(token);
        }
        if let Some(token) = secret("PIVOTAL_TRACKER_TOKEN") {
            self.tracker.api_token = Some(token);
        }
        if let Some(token) = secret("GITHUB_TOKEN") {
            self.code_host.token = Some(token);
        }
    }

    /// Commands that touch the hosting platform need its API key up front
    pub fn require_platform_key(&self) -> Result<(), DeployError> {
        if self.platform.api_key.is_none() {
            return Err(DeployError::ConfigError(
                "platform.api_key must be set (or HEROKU_API_KEY)".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the settings every run needs
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.namespace.is_empty() {
            return Err(DeployError::ConfigError("namespace must be set".to_string()));
        }
        if app_slug(&self.namespace) != self.namespace {
            return Err(DeployError::ConfigError(format!(
                "namespace '{}' must be lowercase letters, digits and hyphens",
                self.namespace
            )));
        }
        if self.wait.poll_interval_secs == 0 {
            return Err(DeployError::ConfigError(
                "wait.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hosting platform settings
#[derive(Debug, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_platform_url")]
    pub base_url: String,

    /// Domain of the platform's generated hostnames
    #[serde(default = "default_app_domain")]
    pub app_domain: String,
}

fn default_platform_url() -> String {
    "https://api.heroku.com".to_string()
}

fn default_app_domain() -> String {
    "herokuapp.com".to_string()
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_platform_url(),
            app_domain: default_app_domain(),
        }
    }
}

/// DNS registrar settings
#[derive(Debug, Deserialize)]
pub struct DnsSettings {
    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub api_token: Option<SecretString>,

    #[serde(default = "default_dns_url")]
    pub base_url: String,
}

fn default_dns_url() -> String {
    "https://api.dnsimple.com/v2".to_string()
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self {
            account_id: None,
            api_token: None,
            base_url: default_dns_url(),
        }
    }
}

/// Issue tracker settings
#[derive(Debug, Deserialize)]
pub struct TrackerSettings {
    #[serde(default)]
    pub api_token: Option<SecretString>,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_tracker_url")]
    pub base_url: String,

    /// State stories move to once deployed
    #[serde(default = "default_delivered_state")]
    pub delivered_state: String,
}

fn default_tracker_url() -> String {
    "https://www.pivotaltracker.com/services/v5".to_string()
}

fn default_delivered_state() -> String {
    "delivered".to_string()
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            project_id: None,
            base_url: default_tracker_url(),
            delivered_state: default_delivered_state(),
        }
    }
}

/// Code host settings
#[derive(Debug, Deserialize)]
pub struct CodeHostSettings {
    #[serde(default)]
    pub token: Option<SecretString>,

    /// `owner/name` of the repository pull requests are opened against
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default = "default_code_host_url")]
    pub base_url: String,

    #[serde(default = "default_branch")]
    pub base_branch: String,
}

fn default_code_host_url() -> String {
    "https://api.github.com".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for CodeHostSettings {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            base_url: default_code_host_url(),
            base_branch: default_branch(),
        }
    }
}

/// Local git settings
#[derive(Debug, Clone, Deserialize)]
pub struct GitSettings {
    /// Remote pull requests are pushed to
    #[serde(default = "default_canonical_remote")]
    pub canonical_remote: String,

    /// Branch on the app remote that triggers a build
    #[serde(default = "default_branch")]
    pub deploy_branch: String,
}

fn default_canonical_remote() -> String {
    "origin".to_string()
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            canonical_remote: default_canonical_remote(),
            deploy_branch: default_branch(),
        }
    }
}

/// Database lifecycle commands run on the platform
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Whether the platform lets the app create its own database
    #[serde(default = "default_true")]
    pub create_database: bool,

    #[serde(default = "default_setup_command")]
    pub setup_command: String,

    #[serde(default = "default_migrate_command")]
    pub migrate_command: String,

    /// Seed command; `null` disables seeding
    #[serde(default = "default_seed_command")]
    pub seed_command: Option<String>,
}

fn default_setup_command() -> String {
    "rake db:create db:migrate".to_string()
}

fn default_migrate_command() -> String {
    "rake db:migrate".to_string()
}

fn default_seed_command() -> Option<String> {
    Some("rake db:seed".to_string())
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            create_database: true,
            setup_command: default_setup_command(),
            migrate_command: default_migrate_command(),
            seed_command: default_seed_command(),
        }
    }
}

impl DatabaseSettings {
    /// Command that prepares a fresh database
    pub fn initial_command(&self) -> &str {
        if self.create_database {
            &self.setup_command
        } else {
            &self.migrate_command
        }
    }
}

/// Remote process wait settings
#[derive(Debug, Clone, Deserialize)]
pub struct WaitSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_wait() -> u64 {
    1800
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
        }
    }
}

impl WaitSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}
