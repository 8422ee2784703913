//! State machine for invitation approval
//!
//! Approval states: Draft → Pending → Approved, Pending → Draft (cancel/reject).
//! Approve is absorbing: it yields Approved from any state.
//!
//! Persisted as two booleans; `ApprovalFlags` is the projection used only at
//! the persistence boundary. `{approved: true, requesting: true}` is illegal.

use serde::{Deserialize, Serialize};

pub use bouquet_common::StateError;

/// Approval lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    #[default]
    Draft,
    Pending,
    Approved,
}

/// Flat persisted form of `ApprovalState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalFlags {
    pub is_approved: bool,
    pub is_requesting_approval: bool,
}

impl ApprovalState {
    /// Decode persisted flags, rejecting the illegal combination
    pub fn from_flags(flags: ApprovalFlags) -> Result<Self, StateError> {
        match (flags.is_approved, flags.is_requesting_approval) {
            (false, false) => Ok(Self::Draft),
            (false, true) => Ok(Self::Pending),
            (true, false) => Ok(Self::Approved),
            (true, true) => Err(StateError::InvalidFlags {
                approved: true,
                requesting: true,
            }),
        }
    }

    pub fn flags(&self) -> ApprovalFlags {
        match self {
            Self::Draft => ApprovalFlags::default(),
            Self::Pending => ApprovalFlags {
                is_approved: false,
                is_requesting_approval: true,
            },
            Self::Approved => ApprovalFlags {
                is_approved: true,
                is_requesting_approval: false,
            },
        }
    }

    /// Owners may not edit or delete while a review is pending
    pub fn locks_owner(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

/// Events that trigger approval state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalEvent {
    /// Owner asks for review
    RequestApproval,
    /// Owner withdraws the request
    Cancel,
    /// Administrator approves
    Approve,
    /// Administrator sends the invitation back to draft
    Reject,
}

impl std::fmt::Display for ApprovalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestApproval => write!(f, "request_approval"),
            Self::Cancel => write!(f, "cancel"),
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Guard context for approval transitions
#[derive(Debug, Clone, Copy)]
pub struct ApprovalGuardContext {
    pub is_admin: bool,
    pub profile_complete: bool,
}

/// Approval state machine
pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: ApprovalState,
        event: ApprovalEvent,
        context: &ApprovalGuardContext,
    ) -> Result<ApprovalState, StateError> {
        if matches!(event, ApprovalEvent::Approve | ApprovalEvent::Reject) && !context.is_admin {
            return Err(StateError::GuardFailed(format!(
                "Only administrators can {event}"
            )));
        }

        let next = match (current, event) {
            (ApprovalState::Draft, ApprovalEvent::RequestApproval) => {
                if !context.profile_complete {
                    return Err(StateError::GuardFailed(
                        "Profile must include a name and phone number".to_string(),
                    ));
                }
                ApprovalState::Pending
            }
            (ApprovalState::Pending, ApprovalEvent::Cancel) => ApprovalState::Draft,
            // Nothing to withdraw
            (ApprovalState::Draft, ApprovalEvent::Cancel) => ApprovalState::Draft,
            (ApprovalState::Approved, ApprovalEvent::Cancel) => ApprovalState::Approved,
            (_, ApprovalEvent::Approve) => ApprovalState::Approved,
            (ApprovalState::Pending, ApprovalEvent::Reject) => ApprovalState::Draft,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: ApprovalState,
        event: ApprovalEvent,
        context: &ApprovalGuardContext,
    ) -> bool {
        Self::transition(current, event, context).is_ok()
    }
}
