//! API models

pub mod dnsimple;
pub mod github;
pub mod heroku;
pub mod tracker;

use serde::{Deserialize, Serialize};

/// Generic error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub message: String,
}
