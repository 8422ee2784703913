//! Approval workflow
//!
//! Drives invitations through Draft → Pending → Approved against an
//! `InvitationStore`. Transitions are not serialized here; two concurrent
//! transitions on the same invitation race at the store with no version check.
//!
//! Guards and transitions are evaluated against the stored record, never the
//! caller's copy, which may be older than the store.
//!
//! Every multi-step transition is compensated: when the second write fails,
//! the first is undone before the error is returned. No retries.

use std::sync::Arc;

use bouquet_auth::Actor;
use bouquet_common::{validate_slug, Error, Result};
use uuid::Uuid;

use crate::domain::entities::{ApprovalRequest, InvitationRecord, NewApprovalRequest};
use crate::domain::state::{
    ApprovalEvent, ApprovalFlags, ApprovalGuardContext, ApprovalStateMachine, StateError,
};
use crate::repository::InvitationStore;

#[derive(Clone)]
pub struct ApprovalWorkflow {
    store: Arc<dyn InvitationStore>,
}

fn guard_context(actor: &Actor) -> ApprovalGuardContext {
    ApprovalGuardContext {
        is_admin: actor.is_admin(),
        profile_complete: actor.profile_complete(),
    }
}

fn ensure_manages(actor: &Actor, invitation: &InvitationRecord) -> Result<()> {
    if !actor.can_manage(invitation.owner_id) {
        return Err(Error::Authorization(
            "You can only manage your own invitation".to_string(),
        ));
    }
    Ok(())
}

fn ensure_admin(actor: &Actor) -> Result<()> {
    if !actor.is_admin() {
        return Err(Error::Authorization(
            "Administrator role required".to_string(),
        ));
    }
    Ok(())
}

impl ApprovalWorkflow {
    pub fn new(store: Arc<dyn InvitationStore>) -> Self {
        Self { store }
    }

    /// Check whether `actor` may delete `invitation` in its current state.
    ///
    /// Administrators may delete in any state; owners never while pending.
    pub fn delete_guard(actor: &Actor, invitation: &InvitationRecord) -> std::result::Result<(), StateError> {
        if actor.is_admin() {
            return Ok(());
        }
        if invitation.approval_state()?.locks_owner() {
            return Err(StateError::GuardFailed(
                "This invitation is waiting for approval. Cancel the request before deleting it."
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Check whether `actor` may edit `invitation` in its current state.
    pub fn edit_guard(actor: &Actor, invitation: &InvitationRecord) -> std::result::Result<(), StateError> {
        if actor.is_admin() {
            return Ok(());
        }
        if invitation.approval_state()?.locks_owner() {
            return Err(StateError::GuardFailed(
                "This invitation is waiting for approval. Cancel the request before editing it."
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<InvitationRecord>> {
        Ok(self.store.get_invitation(id).await?)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<InvitationRecord>> {
        validate_slug(slug)?;
        Ok(self.store.read_invitation(slug).await?)
    }

    /// Save invitation content; the first save for a slug creates the record
    pub async fn save_content(
        &self,
        actor: &Actor,
        slug: &str,
        content: serde_json::Value,
    ) -> Result<InvitationRecord> {
        validate_slug(slug)?;

        let (id, owner_id) = match self.store.read_invitation(slug).await? {
            Some(existing) => {
                ensure_manages(actor, &existing)?;
                Self::edit_guard(actor, &existing)?;
                (existing.id, existing.owner_id)
            }
            None => (Uuid::new_v4(), actor.id),
        };

        let record = self
            .store
            .write_invitation(id, slug, &content, owner_id)
            .await?;

        tracing::info!(invitation_id = %record.id, slug = %record.slug, "Invitation saved");
        Ok(record)
    }

    /// Draft → Pending: create the ledger entry and raise the requesting flag
    pub async fn request_approval(
        &self,
        actor: &Actor,
        invitation: &InvitationRecord,
    ) -> Result<InvitationRecord> {
        if !actor.profile_complete() {
            return Err(Error::ProfileIncomplete);
        }
        let invitation = &self.current(invitation.id).await?;
        ensure_manages(actor, invitation)?;

        let current = invitation.approval_state()?;
        let next = ApprovalStateMachine::transition(
            current,
            ApprovalEvent::RequestApproval,
            &guard_context(actor),
        )?;

        let entry = self
            .store
            .create_approval_request(&NewApprovalRequest::for_invitation(invitation, actor))
            .await?;

        let updated = match self.store.update_approval(invitation.id, next.flags()).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.withdraw_entry(invitation.id).await;
                return Err(Error::NotFound("Invitation not found".to_string()));
            }
            Err(e) => {
                self.withdraw_entry(invitation.id).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            invitation_id = %updated.id,
            request_id = %entry.id,
            "Approval requested"
        );
        Ok(updated)
    }

    /// Pending → Draft. Idempotent: no ledger entry is a successful no-op.
    ///
    /// Returns `None` when the invitation no longer exists.
    pub async fn cancel_request(
        &self,
        actor: &Actor,
        invitation_id: Uuid,
    ) -> Result<Option<InvitationRecord>> {
        let Some(invitation) = self.store.get_invitation(invitation_id).await? else {
            self.store.cancel_approval_request(invitation_id).await?;
            tracing::debug!(%invitation_id, "Cancel for missing invitation");
            return Ok(None);
        };
        ensure_manages(actor, &invitation)?;

        let updated = self
            .settle_ledger(actor, &invitation, ApprovalEvent::Cancel)
            .await?;
        tracing::info!(invitation_id = %invitation_id, "Approval request cancelled");
        Ok(Some(updated))
    }

    /// Any state → Approved, administrator only
    pub async fn approve(
        &self,
        actor: &Actor,
        invitation: &InvitationRecord,
    ) -> Result<InvitationRecord> {
        ensure_admin(actor)?;
        let invitation = self.current(invitation.id).await?;
        let updated = self
            .settle_ledger(actor, &invitation, ApprovalEvent::Approve)
            .await?;
        tracing::info!(invitation_id = %updated.id, admin_id = %actor.id, "Invitation approved");
        Ok(updated)
    }

    /// Pending → Draft, administrator only
    pub async fn reject(
        &self,
        actor: &Actor,
        invitation: &InvitationRecord,
    ) -> Result<InvitationRecord> {
        ensure_admin(actor)?;
        let invitation = self.current(invitation.id).await?;
        let updated = self
            .settle_ledger(actor, &invitation, ApprovalEvent::Reject)
            .await?;
        tracing::info!(invitation_id = %updated.id, admin_id = %actor.id, "Approval request rejected");
        Ok(updated)
    }

    /// Delete an invitation once the state guard allows it
    pub async fn delete(&self, actor: &Actor, invitation: &InvitationRecord) -> Result<()> {
        let invitation = &self.current(invitation.id).await?;
        ensure_manages(actor, invitation)?;
        Self::delete_guard(actor, invitation)?;

        if !self.store.delete_invitation(invitation.id).await? {
            return Err(Error::NotFound("Invitation not found".to_string()));
        }

        tracing::info!(invitation_id = %invitation.id, actor_id = %actor.id, "Invitation deleted");
        Ok(())
    }

    /// Pending approval requests, oldest first (administrators only)
    pub async fn queue(&self, actor: &Actor) -> Result<Vec<ApprovalRequest>> {
        ensure_admin(actor)?;
        Ok(self.store.list_approval_requests().await?)
    }

    async fn current(&self, invitation_id: Uuid) -> Result<InvitationRecord> {
        self.store
            .get_invitation(invitation_id)
            .await?
            .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))
    }

    /// Apply a transition that ends the review: write the flags, then withdraw
    /// the ledger entry. A failed withdrawal restores the previous flags.
    async fn settle_ledger(
        &self,
        actor: &Actor,
        invitation: &InvitationRecord,
        event: ApprovalEvent,
    ) -> Result<InvitationRecord> {
        let previous = invitation.flags();
        let current = invitation.approval_state()?;
        let next = ApprovalStateMachine::transition(current, event, &guard_context(actor))?;

        let updated = if next == current {
            invitation.clone()
        } else {
            self.store
                .update_approval(invitation.id, next.flags())
                .await?
                .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?
        };

        match self.store.cancel_approval_request(invitation.id).await {
            Ok(removed) => {
                tracing::debug!(invitation_id = %invitation.id, removed, "Ledger entry settled");
                Ok(updated)
            }
            Err(e) => {
                if next != current {
                    self.restore_flags(invitation.id, previous).await;
                }
                Err(e.into())
            }
        }
    }

    async fn withdraw_entry(&self, invitation_id: Uuid) {
        if let Err(e) = self.store.cancel_approval_request(invitation_id).await {
            tracing::error!(
                %invitation_id,
                error = %e,
                "Failed to withdraw ledger entry after a failed approval request"
            );
        } else {
            tracing::warn!(%invitation_id, "Withdrew ledger entry after a failed approval request");
        }
    }

    async fn restore_flags(&self, invitation_id: Uuid, flags: ApprovalFlags) {
        if let Err(e) = self.store.update_approval(invitation_id, flags).await {
            tracing::error!(
                %invitation_id,
                error = %e,
                "Failed to restore approval flags after a failed ledger update"
            );
        } else {
            tracing::warn!(%invitation_id, "Restored approval flags after a failed ledger update");
        }
    }
}
