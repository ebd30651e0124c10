//! Pivotal Tracker API v5 models

use serde::{Deserialize, Serialize};

/// A tracker project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// A tracker story
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Comment (note) creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreate {
    pub text: String,
}

/// Story state update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryUpdate {
    pub current_state: String,
}
