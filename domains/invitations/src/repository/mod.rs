//! Persistence for the Invitations domain
//!
//! `InvitationStore` is the persistence collaborator consumed by the approval
//! workflow. `PgInvitationStore` backs it with Postgres; the in-memory store
//! serves tests and local development.

pub mod invitations;
pub mod memory;

use bouquet_common::RepositoryError;
use uuid::Uuid;

use crate::domain::entities::{ApprovalRequest, InvitationRecord, NewApprovalRequest};
use crate::domain::state::ApprovalFlags;

pub use invitations::PgInvitationStore;
pub use memory::{InMemoryInvitationStore, StoreGate, StoreOperation};

/// Persistence collaborator for invitations and the approval ledger
#[async_trait::async_trait]
pub trait InvitationStore: Send + Sync {
    /// Find invitation by slug
    async fn read_invitation(
        &self,
        slug: &str,
    ) -> Result<Option<InvitationRecord>, RepositoryError>;

    /// Find invitation by ID
    async fn get_invitation(&self, id: Uuid) -> Result<Option<InvitationRecord>, RepositoryError>;

    /// Insert the invitation on first save, otherwise replace its content.
    /// Approval flags are never touched here.
    async fn write_invitation(
        &self,
        id: Uuid,
        slug: &str,
        content: &serde_json::Value,
        owner_id: Uuid,
    ) -> Result<InvitationRecord, RepositoryError>;

    /// Persist projected approval flags; `None` when the invitation is gone
    async fn update_approval(
        &self,
        id: Uuid,
        flags: ApprovalFlags,
    ) -> Result<Option<InvitationRecord>, RepositoryError>;

    /// Delete an invitation together with its ledger entry
    async fn delete_invitation(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Ledger entries, oldest first
    async fn list_approval_requests(&self) -> Result<Vec<ApprovalRequest>, RepositoryError>;

    async fn create_approval_request(
        &self,
        request: &NewApprovalRequest,
    ) -> Result<ApprovalRequest, RepositoryError>;

    /// Withdraw the ledger entry for an invitation. Idempotent: returns
    /// `Ok(false)` when there was nothing to withdraw.
    async fn cancel_approval_request(&self, invitation_id: Uuid) -> Result<bool, RepositoryError>;
}
