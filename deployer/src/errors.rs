//! Error types for branchdeploy

use std::time::Duration;

use thiserror::Error;

use crate::deploy::step::Step;

/// Main error type for branchdeploy
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("No active branch: {0}")]
    NoActiveBranch(String),

    #[error("{service} API error {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Command `{command}` failed with exit code {code:?}")]
    Command { command: String, code: Option<i32> },

    #[error("Invalid deployment name: {0}")]
    InvalidName(String),

    #[error("Resource already exists: {0}")]
    DuplicateResource(String),

    #[error("Timed out after {waited:?} waiting for `{command}` to finish")]
    LongRunningProcessTimeout { command: String, waited: Duration },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: Box<DeployError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Wrap an error with the step it happened in
    pub fn in_step(self, step: Step) -> Self {
        match self {
            DeployError::Step { .. } => self,
            other => DeployError::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    /// The step a wrapped error happened in
    pub fn step(&self) -> Option<Step> {
        match self {
            DeployError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the remote API answered with a 404
    pub fn is_not_found(&self) -> bool {
        match self {
            DeployError::Api { status, .. } => *status == 404,
            DeployError::NotFound(_) => true,
            DeployError::Step { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
