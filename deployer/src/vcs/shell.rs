//! Shell adapter running local processes

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::clients::Shell;
use crate::errors::DeployError;

/// Runs commands directly on the local machine, without a shell in between
#[derive(Debug, Clone, Default)]
pub struct SystemShell;

impl SystemShell {
    pub fn new() -> Self {
        Self
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Shell for SystemShell {
    async fn current_branch(&self) -> Result<Option<String>, DeployError> {
        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .output()
            .await?;

        if !output.status.success() {
            debug!(
                "git rev-parse failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        // Detached checkouts report the literal `HEAD`
        if branch.is_empty() || branch == "HEAD" {
            return Ok(None);
        }
        Ok(Some(branch))
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<(), DeployError> {
        let command = describe(program, args);
        info!("Running command: {}", command);

        let status = Command::new(program).args(args).status().await.map_err(|e| {
            DeployError::Internal(format!("Failed to run `{}`: {}", command, e))
        })?;

        if !status.success() {
            return Err(DeployError::Command {
                command,
                code: status.code(),
            });
        }
        Ok(())
    }
}
