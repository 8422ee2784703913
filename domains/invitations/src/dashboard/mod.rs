//! Dashboard actions
//!
//! Every dashboard mutation goes through the `ActionCoordinator`: an action is
//! proposed, the user confirms or dismisses it, and only a confirmed proposal
//! reaches the workflow. Blocked actions open an info-only proposal explaining
//! why instead.

pub mod coordinator;
pub mod proposal;

pub use coordinator::ActionCoordinator;
pub use proposal::{ActionOutcome, BlockReason, DashboardAction, Proposal, ProposalKind};
