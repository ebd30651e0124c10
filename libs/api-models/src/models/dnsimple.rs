//! DNSimple API v2 models

use serde::{Deserialize, Serialize};

/// Envelope used by every DNSimple response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block of list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total_entries: u32,
    pub total_pages: u32,
}

/// A DNS zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub name: String,
}

/// A zone record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
}

/// Record creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
}
