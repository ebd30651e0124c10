//! branchdeploy - Entry Point
//!
//! Deploys the current branch as its own review app, or tears it down again.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use branchdeploy::clients::{Clients, Shell};
use branchdeploy::deploy::orchestrator::{DeployPath, Deployer};
use branchdeploy::deploy::pull_request::PullRequestOutcome;
use branchdeploy::errors::DeployError;
use branchdeploy::filesys::file::File;
use branchdeploy::http::dnsimple::DnsimpleClient;
use branchdeploy::http::github::GitHubClient;
use branchdeploy::http::heroku::HerokuClient;
use branchdeploy::http::tracker::PivotalClient;
use branchdeploy::logs::{init_logging, LogLevel, LogOptions};
use branchdeploy::naming::resolver::{resolve, NameOverrides};
use branchdeploy::storage::layout::StorageLayout;
use branchdeploy::storage::settings::Settings;
use branchdeploy::utils::version_info;
use branchdeploy::vcs::shell::SystemShell;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tokio::sync::watch;
use tracing::{debug, error, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Per-branch review deployments
#[derive(Parser, Debug)]
#[command(name = "branchdeploy")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to .branchdeploy.json, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overriding the settings file
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update the review app for a branch
    Deploy {
        #[command(flatten)]
        names: NameArgs,

        /// Tracker story id (defaults to the branch's leading digits)
        #[arg(long)]
        ticket_id: Option<String>,
    },

    /// Delete the review app, its DNS records and its git remote
    Undeploy {
        #[command(flatten)]
        names: NameArgs,
    },

    /// Print the identifiers derived for a branch without touching anything
    Resolve {
        #[command(flatten)]
        names: NameArgs,

        /// Tracker story id (defaults to the branch's leading digits)
        #[arg(long)]
        ticket_id: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct NameArgs {
    /// Branch to deploy (defaults to the checked-out branch)
    #[arg(long)]
    branch_name: Option<String>,

    /// Git remote name for the app
    #[arg(long)]
    remote_name: Option<String>,

    /// App name, without the namespace prefix
    #[arg(long)]
    app_name: Option<String>,
}

impl NameArgs {
    fn overrides(&self, ticket_id: Option<String>) -> NameOverrides {
        NameOverrides {
            branch_name: self.branch_name.clone(),
            remote_name: self.remote_name.clone(),
            app_name: self.app_name.clone(),
            ticket_id,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), DeployError> {
    let settings_file = match &cli.config {
        Some(path) => File::new(path),
        None => StorageLayout::default().settings_file().await,
    };
    let mut settings = Settings::load(&settings_file).await?;

    let log_options = LogOptions {
        log_level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| settings.log_level.clone())
            .raised_by(cli.verbose),
        json_format: cli.json_logs,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!("branchdeploy {}", version_info());

    if !matches!(cli.command, Command::Resolve { .. }) {
        settings.require_platform_key()?;
    }
    let clients = build_clients(&mut settings)?;

    match cli.command {
        Command::Resolve { names, ticket_id } => {
            let request = resolve(
                clients.shell.as_ref(),
                &settings.namespace,
                &names.overrides(ticket_id),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Deploy { names, ticket_id } => {
            let deployer = Deployer::new(&settings, clients, cancel_on_ctrl_c());
            let report = deployer.deploy(&names.overrides(ticket_id)).await?;

            let verb = match report.path {
                DeployPath::Created => "Created",
                DeployPath::Updated => "Updated",
            };
            println!(
                "{} {} {}",
                verb.green().bold(),
                report.request.full_app_name.bold(),
                report.url
            );
            if let Some(PullRequestOutcome::Created(pr)) = &report.pull_request {
                println!("{} {}", "Pull request".green().bold(), pr.html_url);
            }
        }
        Command::Undeploy { names } => {
            let deployer = Deployer::new(&settings, clients, cancel_on_ctrl_c());
            let report = deployer.undeploy(&names.overrides(None)).await?;
            println!(
                "{} {}",
                "Removed".yellow().bold(),
                report.request.full_app_name.bold()
            );
        }
    }

    Ok(())
}

/// Credentials move out of the settings into the adapters that use them
fn build_clients(settings: &mut Settings) -> Result<Clients, DeployError> {
    let shell: Arc<dyn Shell> = Arc::new(SystemShell::new());

    Ok(Clients {
        platform: Arc::new(HerokuClient::new(
            &settings.platform.base_url,
            settings.platform.api_key.take(),
        )?),
        dns: Arc::new(DnsimpleClient::new(
            &settings.dns.base_url,
            settings.dns.account_id.clone(),
            settings.dns.api_token.take(),
        )?),
        tracker: Arc::new(PivotalClient::new(
            &settings.tracker.base_url,
            settings.tracker.api_token.take(),
        )?),
        code_host: Arc::new(GitHubClient::new(
            &settings.code_host.base_url,
            settings.code_host.token.take(),
        )?),
        shell,
    })
}

/// First Ctrl+C stops any wait on a remote process; a second one exits
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Ctrl+C received, cancelling remote waits (press again to exit)");
        let _ = cancel_tx.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted".red().bold());
            std::process::exit(130);
        }
    });

    cancel_rx
}
