//! Wire models for the remote APIs driven by branchdeploy.

pub mod models;
