//! Waiting for long-running remote processes

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::clients::HostingPlatform;
use crate::errors::DeployError;
use crate::storage::settings::WaitSettings;

/// Waiter options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between polls
    pub poll_interval: Duration,

    /// Give up after this long
    pub max_wait: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(1800),
        }
    }
}

impl From<&WaitSettings> for Options {
    fn from(settings: &WaitSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            max_wait: settings.max_wait(),
        }
    }
}

/// Whether any running process was started from `command` (case-insensitive)
pub fn is_running(processes: &[String], command: &str) -> bool {
    let needle = command.to_lowercase();
    processes
        .iter()
        .any(|p| p.to_lowercase().contains(&needle))
}

/// Polls a platform's process list until a command is gone
pub struct ProcessWaiter {
    options: Options,
    cancel: watch::Receiver<bool>,
}

impl ProcessWaiter {
    /// `cancel` flips to `true` when the operator asks to stop waiting
    pub fn new(options: Options, cancel: watch::Receiver<bool>) -> Self {
        Self { options, cancel }
    }

    /// Block until no process of `app` matches `command`.
    ///
    /// Fails with [`DeployError::LongRunningProcessTimeout`] after
    /// `max_wait`, or [`DeployError::Cancelled`] when cancelled.
    pub async fn wait(
        &self,
        platform: &dyn HostingPlatform,
        app: &str,
        command: &str,
    ) -> Result<(), DeployError> {
        info!("Waiting for `{}` to finish", command);
        let started = Instant::now();
        let deadline = started + self.options.max_wait;
        let mut cancel = self.cancel.clone();

        loop {
            let processes = platform.list_processes(app).await?;
            if !is_running(&processes, command) {
                info!("`{}` finished after {:?}", command, started.elapsed());
                return Ok(());
            }

            if Instant::now() + self.options.poll_interval > deadline {
                return Err(DeployError::LongRunningProcessTimeout {
                    command: command.to_string(),
                    waited: started.elapsed(),
                });
            }

            debug!("`{}` still running on {}", command, app);
            tokio::select! {
                cancelled = async { cancel.wait_for(|c| *c).await.is_ok() } => {
                    // A dropped sender can never cancel; keep polling
                    if cancelled {
                        return Err(DeployError::Cancelled(format!(
                            "stopped waiting for `{}`",
                            command
                        )));
                    }
                    tokio::time::sleep(self.options.poll_interval).await;
                }
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }
        }
    }
}
