//! branchdeploy library
//!
//! Provisions and tears down per-branch review apps: hosting platform app,
//! DNS records, config, add-ons, collaborators, database and pull request.

pub mod clients;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod naming;
pub mod storage;
pub mod utils;
pub mod vcs;
