//! Transition rules for test requests.
//!
//! Everything here is pure: given a request, an operation and the acting
//! user, decide whether the move is legal and where it lands.

use crate::error::{Result, UpstacError};
use crate::request::TestRequest;
use crate::types::{FlowOperation, RequestStatus, Role};
use crate::user::{ActorRef, User};

/// Status the request must be in before `op` may run.
pub fn required_status(op: FlowOperation) -> RequestStatus {
    match op {
        FlowOperation::AssignForLabTest => RequestStatus::Initiated,
        FlowOperation::SubmitLabResult => RequestStatus::LabTestInProgress,
        FlowOperation::AssignForConsultation => RequestStatus::LabTestCompleted,
        FlowOperation::SubmitConsultation => RequestStatus::DiagnosisInProcess,
    }
}

pub fn required_role(op: FlowOperation) -> Role {
    match op {
        FlowOperation::AssignForLabTest | FlowOperation::SubmitLabResult => Role::Tester,
        FlowOperation::AssignForConsultation | FlowOperation::SubmitConsultation => Role::Doctor,
    }
}

pub fn next_status(op: FlowOperation) -> RequestStatus {
    match op {
        FlowOperation::AssignForLabTest => RequestStatus::LabTestInProgress,
        FlowOperation::SubmitLabResult => RequestStatus::LabTestCompleted,
        FlowOperation::AssignForConsultation => RequestStatus::DiagnosisInProcess,
        FlowOperation::SubmitConsultation => RequestStatus::Completed,
    }
}

/// Status/role half of the decision. Assignment ownership is checked by [`check`].
pub fn can_transition(current: RequestStatus, op: FlowOperation, role: Role) -> bool {
    current == required_status(op) && role == required_role(op)
}

/// The actor bound to the request for the role that `op` needs, if any.
fn assignee(request: &TestRequest, op: FlowOperation) -> Option<&ActorRef> {
    match required_role(op) {
        Role::Tester => request.assigned_tester.as_ref(),
        Role::Doctor => request.assigned_doctor.as_ref(),
        _ => None,
    }
}

/// Full validation of `op` on `request` by `actor`.
///
/// Checks, in order: the actor holds the role, the request is in the required
/// status, and for submit operations the actor is the one assigned.
/// Returns the status the request moves to.
pub fn check(request: &TestRequest, op: FlowOperation, actor: &User) -> Result<RequestStatus> {
    let role = required_role(op);
    if !actor.has_role(role) {
        return Err(UpstacError::MissingRole {
            username: actor.username.clone(),
            role: role.to_string(),
        });
    }

    if !can_transition(request.status, op, role) {
        return Err(UpstacError::InvalidTransition {
            id: request.id,
            from: request.status.to_string(),
            operation: op.to_string(),
        });
    }

    if op.requires_assignee() {
        match assignee(request, op) {
            Some(bound) if actor.is(bound) => {}
            _ => {
                return Err(UpstacError::NotAssignedActor {
                    id: request.id,
                    username: actor.username.clone(),
                })
            }
        }
    }

    Ok(next_status(op))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
