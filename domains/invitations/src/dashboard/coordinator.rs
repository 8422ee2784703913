//! Action coordinator
//!
//! Holds the open proposal and the set of invitations with an action in
//! flight for one session actor. Execution re-checks the stored record before
//! dispatching, so a proposal opened on an older copy cannot bypass a guard.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bouquet_auth::Actor;
use bouquet_common::{Error, Notice, NoticeBus, Result};
use tokio::sync::watch;
use uuid::Uuid;

use super::proposal::{ActionOutcome, BlockReason, DashboardAction, Proposal, ProposalKind};
use crate::domain::entities::InvitationRecord;
use crate::domain::state::ApprovalState;
use crate::workflow::ApprovalWorkflow;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks one invitation busy for as long as it lives
struct BusyGuard {
    busy: Arc<Mutex<HashSet<Uuid>>>,
    target: Uuid,
}

impl BusyGuard {
    fn acquire(busy: &Arc<Mutex<HashSet<Uuid>>>, target: Uuid) -> Option<Self> {
        if !lock(busy).insert(target) {
            return None;
        }
        Some(Self {
            busy: Arc::clone(busy),
            target,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock(&self.busy).remove(&self.target);
    }
}

/// Propose-then-execute front door for dashboard mutations, scoped to one
/// session actor.
///
/// At most one proposal is open at a time; opening a new one replaces it.
#[derive(Clone)]
pub struct ActionCoordinator {
    workflow: ApprovalWorkflow,
    actor: Actor,
    notices: NoticeBus,
    open: Arc<watch::Sender<Option<Proposal>>>,
    busy: Arc<Mutex<HashSet<Uuid>>>,
}

impl ActionCoordinator {
    pub fn new(workflow: ApprovalWorkflow, actor: Actor, notices: NoticeBus) -> Self {
        let (open, _) = watch::channel(None);
        Self {
            workflow,
            actor,
            notices,
            open: Arc::new(open),
            busy: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    #[mutants::skip] // Plain accessor
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Watch the currently open proposal
    pub fn subscribe(&self) -> watch::Receiver<Option<Proposal>> {
        self.open.subscribe()
    }

    pub fn current(&self) -> Option<Proposal> {
        self.open.borrow().clone()
    }

    pub fn is_busy(&self, target: Uuid) -> bool {
        lock(&self.busy).contains(&target)
    }

    /// Single UI entry point: open a proposal with the default prompt
    pub fn invoke(&self, action: DashboardAction, target: InvitationRecord) -> Proposal {
        let prompt = action.default_prompt(&target.slug);
        self.propose(action, target, prompt)
    }

    /// Open a confirmation for `action` on `target`.
    ///
    /// A blocked action opens an info-only proposal carrying the explanation.
    pub fn propose(
        &self,
        action: DashboardAction,
        target: InvitationRecord,
        prompt: impl Into<String>,
    ) -> Proposal {
        let (kind, prompt) = match self.block_reason(action, &target) {
            Some(reason) => {
                let explanation = reason.explanation();
                (
                    ProposalKind::InfoOnly {
                        blocked: action,
                        reason,
                    },
                    explanation,
                )
            }
            None => (ProposalKind::Confirm { action }, prompt.into()),
        };

        let proposal = Proposal {
            id: Uuid::new_v4(),
            kind,
            target,
            prompt,
        };

        tracing::debug!(
            proposal_id = %proposal.id,
            invitation_id = %proposal.target.id,
            %action,
            info_only = proposal.is_info_only(),
            "Proposal opened"
        );
        self.open.send_replace(Some(proposal.clone()));
        proposal
    }

    /// Close the open proposal without running anything
    pub fn dismiss(&self) {
        self.open.send_replace(None);
    }

    /// Confirm the open proposal. Info-only proposals are only dismissed.
    pub async fn confirm(&self) -> Result<ActionOutcome> {
        let Some(proposal) = self.open.send_replace(None) else {
            return Err(Error::Conflict("No action is waiting for confirmation".to_string()));
        };

        match proposal.kind {
            ProposalKind::InfoOnly {
                reason: BlockReason::ProfileIncomplete,
                ..
            } => Ok(ActionOutcome::ProfileRequired),
            ProposalKind::InfoOnly { .. } => Ok(ActionOutcome::Dismissed),
            ProposalKind::Confirm { action } => self.execute(action, &proposal.target).await,
        }
    }

    /// Run `action` against `target`, rejecting re-entrant calls for the same
    /// invitation while one is in flight.
    ///
    /// The action is checked again against the stored record; a blocked action
    /// opens an info-only proposal and returns `ActionOutcome::Blocked`.
    pub async fn execute(
        &self,
        action: DashboardAction,
        target: &InvitationRecord,
    ) -> Result<ActionOutcome> {
        let Some(_guard) = BusyGuard::acquire(&self.busy, target.id) else {
            return Err(Error::Conflict(
                "Another action is already running for this invitation".to_string(),
            ));
        };

        match self.dispatch(action, target).await {
            Ok(outcome) => Ok(outcome),
            Err(Error::ProfileIncomplete) => {
                self.notices.emit(
                    Notice::warning("PROFILE_INCOMPLETE", BlockReason::ProfileIncomplete.explanation())
                        .with_target(target.id),
                );
                Ok(ActionOutcome::ProfileRequired)
            }
            Err(e) => {
                tracing::warn!(
                    invitation_id = %target.id,
                    %action,
                    error = %e,
                    "Dashboard action failed"
                );
                self.notices
                    .emit(Notice::from_error(&e).with_target(target.id));
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        action: DashboardAction,
        target: &InvitationRecord,
    ) -> Result<ActionOutcome> {
        let stored = match self.workflow.find(target.id).await? {
            Some(record) => record,
            // Cancelling a missing invitation is a no-op
            None if action == DashboardAction::CancelRequest => target.clone(),
            None => return Err(Error::NotFound("Invitation not found".to_string())),
        };

        match self.block_reason(action, &stored) {
            Some(BlockReason::ProfileIncomplete) => return Err(Error::ProfileIncomplete),
            Some(reason) => {
                tracing::info!(invitation_id = %stored.id, %action, ?reason, "Dashboard action blocked");
                self.invoke(action, stored);
                return Ok(ActionOutcome::Blocked(reason));
            }
            None => {}
        }
        let target = &stored;

        let record = match action {
            DashboardAction::RequestApproval => self
                .workflow
                .request_approval(&self.actor, target)
                .await
                .map(Some),
            DashboardAction::CancelRequest => {
                self.workflow.cancel_request(&self.actor, target.id).await
            }
            DashboardAction::Approve => self.workflow.approve(&self.actor, target).await.map(Some),
            DashboardAction::Reject => self.workflow.reject(&self.actor, target).await.map(Some),
            DashboardAction::Delete => self
                .workflow
                .delete(&self.actor, target)
                .await
                .map(|()| None),
        }?;
        Ok(ActionOutcome::Completed(record))
    }

    fn block_reason(&self, action: DashboardAction, target: &InvitationRecord) -> Option<BlockReason> {
        let state = match target.approval_state() {
            Ok(state) => state,
            Err(e) => return Some(BlockReason::InvalidState(e.to_string())),
        };
        let invalid = || BlockReason::InvalidState(format!("cannot {action} while {state}"));

        match action {
            DashboardAction::RequestApproval => {
                if !self.actor.can_manage(target.owner_id) {
                    Some(BlockReason::NotPermitted)
                } else if state != ApprovalState::Draft {
                    Some(invalid())
                } else if !self.actor.profile_complete() {
                    Some(BlockReason::ProfileIncomplete)
                } else {
                    None
                }
            }
            DashboardAction::CancelRequest => {
                (!self.actor.can_manage(target.owner_id)).then_some(BlockReason::NotPermitted)
            }
            DashboardAction::Approve => {
                (!self.actor.is_admin()).then_some(BlockReason::NotPermitted)
            }
            DashboardAction::Reject => {
                if !self.actor.is_admin() {
                    Some(BlockReason::NotPermitted)
                } else if state != ApprovalState::Pending {
                    Some(invalid())
                } else {
                    None
                }
            }
            DashboardAction::Delete => {
                if !self.actor.can_manage(target.owner_id) {
                    Some(BlockReason::NotPermitted)
                } else if ApprovalWorkflow::delete_guard(&self.actor, target).is_err() {
                    Some(BlockReason::PendingApproval)
                } else {
                    None
                }
            }
        }
    }
}
