//! Git and URL commands issued through a [`Shell`]

use tracing::warn;

use crate::clients::Shell;
use crate::errors::DeployError;

/// Push `branch` to `remote`, optionally onto a differently named remote branch
pub async fn push(
    shell: &dyn Shell,
    remote: &str,
    branch: &str,
    target: Option<&str>,
) -> Result<(), DeployError> {
    let refspec = match target {
        Some(target) => format!("{}:{}", branch, target),
        None => branch.to_string(),
    };
    shell.run("git", &["push", remote, &refspec]).await
}

pub async fn add_remote(shell: &dyn Shell, name: &str, url: &str) -> Result<(), DeployError> {
    shell.run("git", &["remote", "add", name, url]).await
}

/// Point remote `name` at `url`, repointing it when it already exists
pub async fn set_remote(shell: &dyn Shell, name: &str, url: &str) -> Result<(), DeployError> {
    match add_remote(shell, name, url).await {
        Err(DeployError::Command { command, code }) => {
            warn!("`{}` exited with {:?}; updating the existing remote", command, code);
            shell.run("git", &["remote", "set-url", name, url]).await
        }
        other => other,
    }
}

pub async fn remove_remote(shell: &dyn Shell, name: &str) -> Result<(), DeployError> {
    shell.run("git", &["remote", "rm", name]).await
}

/// Program that opens a URL in the desktop browser
pub fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

pub async fn open_url(shell: &dyn Shell, url: &str) -> Result<(), DeployError> {
    shell.run(opener(), &[url]).await
}
