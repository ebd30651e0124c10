//! HTTP adapters for the remote collaborators

pub mod client;
pub mod dnsimple;
pub mod github;
pub mod heroku;
pub mod tracker;
