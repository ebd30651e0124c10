//! Finite State Machine for a deploy or undeploy run

use serde::Serialize;

use crate::deploy::step::Step;

/// Deployment state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// Identity not derived yet
    Unresolved,

    /// Identifiers derived from the branch
    Identified,

    /// The app already exists on the platform
    Existing,

    /// The app does not exist on the platform
    NotExisting,

    /// Create or update sequence finished
    Provisioned,

    /// Waiting on the pull request step
    PullRequestPending,

    /// Run finished successfully
    Complete,

    /// Run stopped at a step
    Failed(Step),
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Identity resolved
    Resolved,

    /// Existence check found the app
    AppFound,

    /// Existence check did not find the app
    AppMissing,

    /// Provisioning sequence completed
    Provisioned,

    /// Pull request step started
    PullRequestRequested,

    /// Run completed
    Completed,

    /// A step failed
    StepFailed(Step),
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    history: Vec<DeploymentState>,
}

impl DeploymentFsm {
    /// Create a new FSM in unresolved state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Unresolved,
            history: vec![DeploymentState::Unresolved],
        }
    }

    /// Get current state
    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Every state visited, oldest first
    pub fn history(&self) -> &[DeploymentState] {
        &self.history
    }

    /// Step the run failed at, if it failed
    pub fn failed_step(&self) -> Option<Step> {
        match self.state {
            DeploymentState::Failed(step) => Some(step),
            _ => None,
        }
    }

    /// Whether the run reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            DeploymentState::Complete | DeploymentState::Failed(_)
        )
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            (DeploymentState::Unresolved, DeploymentEvent::Resolved) => DeploymentState::Identified,

            (DeploymentState::Identified, DeploymentEvent::AppFound) => DeploymentState::Existing,
            (DeploymentState::Identified, DeploymentEvent::AppMissing) => {
                DeploymentState::NotExisting
            }
            // Teardown needs no existence check
            (DeploymentState::Identified, DeploymentEvent::Completed) => DeploymentState::Complete,

            (DeploymentState::Existing, DeploymentEvent::Provisioned)
            | (DeploymentState::NotExisting, DeploymentEvent::Provisioned) => {
                DeploymentState::Provisioned
            }

            (DeploymentState::Provisioned, DeploymentEvent::PullRequestRequested) => {
                DeploymentState::PullRequestPending
            }
            (DeploymentState::Provisioned, DeploymentEvent::Completed)
            | (DeploymentState::PullRequestPending, DeploymentEvent::Completed) => {
                DeploymentState::Complete
            }

            (state, DeploymentEvent::StepFailed(step))
                if !matches!(state, DeploymentState::Complete | DeploymentState::Failed(_)) =>
            {
                DeploymentState::Failed(*step)
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.history.push(new_state.clone());
        self.state = new_state;
        Ok(())
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
