//! Dashboard proposals
//!
//! Actions, the reasons an action can be blocked, and the proposal a user
//! confirms or dismisses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::InvitationRecord;

/// Mutations the dashboard can invoke on an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardAction {
    RequestApproval,
    CancelRequest,
    Approve,
    Reject,
    Delete,
}

impl DashboardAction {
    /// Confirmation text used when the caller does not supply one
    pub fn default_prompt(&self, slug: &str) -> String {
        match self {
            DashboardAction::RequestApproval => {
                format!("Send \"{slug}\" for approval? You cannot edit it while it is reviewed.")
            }
            DashboardAction::CancelRequest => {
                format!("Cancel the approval request for \"{slug}\"?")
            }
            DashboardAction::Approve => format!("Approve \"{slug}\"?"),
            DashboardAction::Reject => {
                format!("Reject \"{slug}\" and return it to the owner?")
            }
            DashboardAction::Delete => {
                format!("Delete \"{slug}\"? This cannot be undone.")
            }
        }
    }
}

impl std::fmt::Display for DashboardAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardAction::RequestApproval => write!(f, "request_approval"),
            DashboardAction::CancelRequest => write!(f, "cancel_request"),
            DashboardAction::Approve => write!(f, "approve"),
            DashboardAction::Reject => write!(f, "reject"),
            DashboardAction::Delete => write!(f, "delete"),
        }
    }
}

/// Why an action cannot proceed right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum BlockReason {
    /// Owner tried to delete or edit while the invitation is under review
    PendingApproval,
    /// Name or phone missing from the actor profile
    ProfileIncomplete,
    NotPermitted,
    InvalidState(String),
}

impl BlockReason {
    pub fn explanation(&self) -> String {
        match self {
            BlockReason::PendingApproval => {
                "This invitation is waiting for approval. Cancel the request first.".to_string()
            }
            BlockReason::ProfileIncomplete => {
                "Add your name and phone number to your profile before requesting approval."
                    .to_string()
            }
            BlockReason::NotPermitted => {
                "You do not have permission to do this.".to_string()
            }
            BlockReason::InvalidState(detail) => {
                format!("This action is not available right now: {detail}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalKind {
    /// Confirming runs the action
    Confirm { action: DashboardAction },
    /// Confirming only dismisses
    InfoOnly {
        blocked: DashboardAction,
        reason: BlockReason,
    },
}

/// A confirmation waiting for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub kind: ProposalKind,
    pub target: InvitationRecord,
    pub prompt: String,
}

impl Proposal {
    pub fn is_info_only(&self) -> bool {
        matches!(self.kind, ProposalKind::InfoOnly { .. })
    }
}

/// Result of confirming a proposal or executing an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The action ran; carries the updated record, `None` after a delete
    Completed(Option<InvitationRecord>),
    /// Info-only proposal dismissed, nothing ran
    Dismissed,
    /// The actor must complete their profile first
    ProfileRequired,
    /// The stored record no longer allows the action; an info-only proposal
    /// explaining why is now open
    Blocked(BlockReason),
}
