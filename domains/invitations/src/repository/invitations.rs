//! Postgres invitation store

use bouquet_common::RepositoryError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::InvitationStore;
use crate::domain::entities::{ApprovalRequest, InvitationRecord, NewApprovalRequest};
use crate::domain::state::ApprovalFlags;

/// All columns in the invitations table, used for SELECT and RETURNING clauses.
const INVITATION_COLUMNS: &str = "\
    id, slug, owner_id, content, \
    is_approved, is_requesting_approval, \
    created_at, updated_at";

const APPROVAL_REQUEST_COLUMNS: &str = "\
    id, invitation_id, invitation_slug, \
    requester_name, requester_phone, created_at";

/// Map unique-constraint violations to `AlreadyExists`
fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepositoryError::AlreadyExists;
        }
        if db.is_check_violation() {
            return RepositoryError::InvalidData(db.message().to_string());
        }
    }
    RepositoryError::Connection(err)
}

#[derive(Clone)]
pub struct PgInvitationStore {
    pool: PgPool,
}

impl PgInvitationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait::async_trait]
impl InvitationStore for PgInvitationStore {
    async fn read_invitation(
        &self,
        slug: &str,
    ) -> Result<Option<InvitationRecord>, RepositoryError> {
        let query = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE slug = $1");
        let record = sqlx::query_as::<_, InvitationRecord>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn get_invitation(&self, id: Uuid) -> Result<Option<InvitationRecord>, RepositoryError> {
        let query = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1");
        let record = sqlx::query_as::<_, InvitationRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn write_invitation(
        &self,
        id: Uuid,
        slug: &str,
        content: &serde_json::Value,
        owner_id: Uuid,
    ) -> Result<InvitationRecord, RepositoryError> {
        let query = format!(
            "INSERT INTO invitations ({INVITATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, FALSE, FALSE, NOW(), NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
                 slug = EXCLUDED.slug, content = EXCLUDED.content, updated_at = NOW() \
             RETURNING {INVITATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, InvitationRecord>(&query)
            .bind(id)
            .bind(slug)
            .bind(owner_id)
            .bind(Json(content))
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(record)
    }

    async fn update_approval(
        &self,
        id: Uuid,
        flags: ApprovalFlags,
    ) -> Result<Option<InvitationRecord>, RepositoryError> {
        let query = format!(
            "UPDATE invitations \
             SET is_approved = $2, is_requesting_approval = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {INVITATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, InvitationRecord>(&query)
            .bind(id)
            .bind(flags.is_approved)
            .bind(flags.is_requesting_approval)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(record)
    }

    async fn delete_invitation(&self, id: Uuid) -> Result<bool, RepositoryError> {
        // approval_requests rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_approval_requests(&self) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        let query = format!(
            "SELECT {APPROVAL_REQUEST_COLUMNS} FROM approval_requests ORDER BY created_at ASC"
        );
        let requests = sqlx::query_as::<_, ApprovalRequest>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn create_approval_request(
        &self,
        request: &NewApprovalRequest,
    ) -> Result<ApprovalRequest, RepositoryError> {
        let entry = request.clone().into_request();
        let query = format!(
            "INSERT INTO approval_requests ({APPROVAL_REQUEST_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {APPROVAL_REQUEST_COLUMNS}"
        );
        let created = sqlx::query_as::<_, ApprovalRequest>(&query)
            .bind(entry.id)
            .bind(entry.invitation_id)
            .bind(&entry.invitation_slug)
            .bind(&entry.requester_name)
            .bind(&entry.requester_phone)
            .bind(entry.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(created)
    }

    async fn cancel_approval_request(&self, invitation_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM approval_requests WHERE invitation_id = $1")
            .bind(invitation_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
