//! FSM unit tests

use branchdeploy::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
use branchdeploy::deploy::step::Step;

#[test]
fn test_fsm_initial_state() {
    let fsm = DeploymentFsm::new();
    assert_eq!(fsm.state(), &DeploymentState::Unresolved);
    assert!(fsm.failed_step().is_none());
    assert!(!fsm.is_terminal());
    assert_eq!(fsm.history(), &[DeploymentState::Unresolved]);
}

#[test]
fn test_fsm_update_flow() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Resolved).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Identified);

    // Identified -> Existing
    fsm.process(DeploymentEvent::AppFound).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Existing);

    // Existing -> Provisioned -> Complete, no pull request
    fsm.process(DeploymentEvent::Provisioned).unwrap();
    fsm.process(DeploymentEvent::Completed).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Complete);
    assert!(!fsm.history().contains(&DeploymentState::PullRequestPending));
}

#[test]
fn test_fsm_teardown_flow() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Resolved).unwrap();
    fsm.process(DeploymentEvent::Completed).unwrap();

    assert_eq!(
        fsm.history(),
        &[
            DeploymentState::Unresolved,
            DeploymentState::Identified,
            DeploymentState::Complete,
        ]
    );
}

#[test]
fn test_fsm_failure_records_step() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Resolved).unwrap();
    fsm.process(DeploymentEvent::AppMissing).unwrap();
    fsm.process(DeploymentEvent::StepFailed(Step::AddAddons))
        .unwrap();

    assert_eq!(fsm.state(), &DeploymentState::Failed(Step::AddAddons));
    assert_eq!(fsm.failed_step(), Some(Step::AddAddons));
    assert!(fsm.is_terminal());
}

#[test]
fn test_fsm_resolution_can_fail() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::StepFailed(Step::ResolveIdentity))
        .unwrap();
    assert_eq!(fsm.failed_step(), Some(Step::ResolveIdentity));
}

#[test]
fn test_fsm_invalid_transitions() {
    let mut fsm = DeploymentFsm::new();

    // Cannot check existence before resolving
    assert!(fsm.process(DeploymentEvent::AppFound).is_err());

    fsm.process(DeploymentEvent::Resolved).unwrap();
    fsm.process(DeploymentEvent::AppFound).unwrap();

    // Pull requests only follow first-time provisioning of a provisioned app
    assert!(fsm.process(DeploymentEvent::PullRequestRequested).is_err());
    assert!(fsm.process(DeploymentEvent::AppMissing).is_err());
    assert_eq!(fsm.state(), &DeploymentState::Existing);

    fsm.process(DeploymentEvent::Provisioned).unwrap();
    fsm.process(DeploymentEvent::Completed).unwrap();

    // Complete is terminal
    assert!(fsm.process(DeploymentEvent::StepFailed(Step::PushCode)).is_err());
    assert!(fsm.process(DeploymentEvent::Resolved).is_err());
}
