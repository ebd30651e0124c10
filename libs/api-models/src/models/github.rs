//! GitHub REST models

use serde::{Deserialize, Serialize};

/// Pull request creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestCreate {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// A created pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Validation failure body (HTTP 422)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationFailed {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
}

/// A single validation error entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ValidationFailed {
    /// Whether the failure reports an already-open pull request for the head branch
    pub fn is_duplicate_pull_request(&self) -> bool {
        self.errors.iter().any(|e| {
            e.message
                .as_deref()
                .is_some_and(|m| m.starts_with("A pull request already exists"))
        })
    }
}
