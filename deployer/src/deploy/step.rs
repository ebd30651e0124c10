//! Named provisioning steps

use serde::Serialize;
use strum::{Display, EnumIter};

/// A single step of a deploy or undeploy run.
///
/// The display form is what operators see in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[strum(serialize = "resolve identity")]
    ResolveIdentity,
    #[strum(serialize = "check app existence")]
    CheckExistence,
    #[strum(serialize = "create app")]
    CreateApp,
    #[strum(serialize = "add collaborators")]
    AddCollaborators,
    #[strum(serialize = "add add-ons")]
    AddAddons,
    #[strum(serialize = "create dns records")]
    CreateDnsRecords,
    #[strum(serialize = "add custom domains")]
    AddCustomDomains,
    #[strum(serialize = "set environment variables")]
    SetEnvironment,
    #[strum(serialize = "push code")]
    PushCode,
    #[strum(serialize = "set up database")]
    SetupDatabase,
    #[strum(serialize = "migrate database")]
    MigrateDatabase,
    #[strum(serialize = "notify tracker")]
    NotifyTracker,
    #[strum(serialize = "create pull request")]
    CreatePullRequest,
    #[strum(serialize = "delete app")]
    DeleteApp,
    #[strum(serialize = "remove dns records")]
    RemoveDnsRecords,
    #[strum(serialize = "remove git remote")]
    RemoveGitRemote,
}

/// Steps of the create path, in execution order
pub const CREATE_PATH: [Step; 9] = [
    Step::CreateApp,
    Step::AddCollaborators,
    Step::AddAddons,
    Step::CreateDnsRecords,
    Step::AddCustomDomains,
    Step::SetEnvironment,
    Step::PushCode,
    Step::SetupDatabase,
    Step::NotifyTracker,
];

/// Steps of the update path, in execution order
pub const UPDATE_PATH: [Step; 5] = [
    Step::SetEnvironment,
    Step::AddCollaborators,
    Step::PushCode,
    Step::MigrateDatabase,
    Step::NotifyTracker,
];

/// Steps of an undeploy run, in execution order
pub const TEARDOWN_PATH: [Step; 3] = [Step::DeleteApp, Step::RemoveDnsRecords, Step::RemoveGitRemote];
