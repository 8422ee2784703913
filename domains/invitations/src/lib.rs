//! Invitations domain: approval lifecycle, approval-request ledger, dashboard actions

pub mod dashboard;
pub mod domain;
pub mod repository;
pub mod workflow;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{ApprovalRequest, InvitationRecord, NewApprovalRequest};
pub use domain::state::{
    ApprovalEvent, ApprovalFlags, ApprovalGuardContext, ApprovalState, ApprovalStateMachine,
};

// Re-export repository types
pub use repository::{
    InMemoryInvitationStore, InvitationStore, PgInvitationStore, StoreGate, StoreOperation,
};

pub use dashboard::{
    ActionCoordinator, ActionOutcome, BlockReason, DashboardAction, Proposal, ProposalKind,
};
pub use workflow::ApprovalWorkflow;
