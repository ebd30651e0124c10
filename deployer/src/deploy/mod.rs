//! Deployment module

pub mod fsm;
pub mod orchestrator;
pub mod pull_request;
pub mod step;
pub mod waiter;
