//! Domain entities for the Invitations domain
//!
//! `InvitationRecord` content is opaque to this crate; only the approval flags
//! and identity fields are interpreted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use bouquet_auth::Actor;
use bouquet_common::{validate_slug, Result};

use crate::domain::state::{ApprovalFlags, ApprovalState, StateError};

/// Invitation document owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationRecord {
    pub id: Uuid,
    pub slug: String,
    pub owner_id: Uuid,
    pub content: Json<serde_json::Value>,
    pub is_approved: bool,
    pub is_requesting_approval: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvitationRecord {
    /// Create a new draft invitation with validation
    pub fn new(slug: impl Into<String>, owner_id: Uuid, content: serde_json::Value) -> Result<Self> {
        let slug = slug.into();
        validate_slug(&slug)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug,
            owner_id,
            content: Json(content),
            is_approved: false,
            is_requesting_approval: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn flags(&self) -> ApprovalFlags {
        ApprovalFlags {
            is_approved: self.is_approved,
            is_requesting_approval: self.is_requesting_approval,
        }
    }

    /// Current approval state decoded from the persisted flags
    pub fn approval_state(&self) -> std::result::Result<ApprovalState, StateError> {
        ApprovalState::from_flags(self.flags())
    }

    /// Apply a projected state to the flags
    pub fn set_state(&mut self, state: ApprovalState) {
        let flags = state.flags();
        self.is_approved = flags.is_approved;
        self.is_requesting_approval = flags.is_requesting_approval;
        self.updated_at = Utc::now();
    }
}

/// Ledger entry: one pending human-review request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApprovalRequest {
    pub id: Uuid,
    pub invitation_id: Uuid,
    pub invitation_slug: String,
    pub requester_name: String,
    pub requester_phone: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApprovalRequest {
    pub invitation_id: Uuid,
    pub invitation_slug: String,
    pub requester_name: String,
    pub requester_phone: String,
}

impl NewApprovalRequest {
    /// Build a ledger entry for `invitation` requested by `actor`
    pub fn for_invitation(invitation: &InvitationRecord, actor: &Actor) -> Self {
        Self {
            invitation_id: invitation.id,
            invitation_slug: invitation.slug.clone(),
            requester_name: actor.name().trim().to_string(),
            requester_phone: actor.phone().trim().to_string(),
        }
    }

    pub fn into_request(self) -> ApprovalRequest {
        ApprovalRequest {
            id: Uuid::new_v4(),
            invitation_id: self.invitation_id,
            invitation_slug: self.invitation_slug,
            requester_name: self.requester_name,
            requester_phone: self.requester_phone,
            created_at: Utc::now(),
        }
    }
}
