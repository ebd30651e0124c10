//! Heroku Platform API v3 models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An application as returned by `GET /apps`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// App creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A running process (dyno)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dyno {
    #[serde(default)]
    pub id: Option<String>,
    pub command: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// One-off process creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynoCreate {
    pub command: String,
    #[serde(default)]
    pub attach: bool,
}

/// Collaborator creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorCreate {
    pub user: String,
    #[serde(default)]
    pub silent: bool,
}

/// Custom domain creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCreate {
    pub hostname: String,
}

/// Add-on creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonCreate {
    pub plan: String,
}
