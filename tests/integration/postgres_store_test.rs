//! Postgres invitation store against a real database
//!
//! Requires `TEST_DATABASE_URL`; every test returns early when it is unset.

mod common;

use std::sync::Arc;

use bouquet_common::RepositoryError;
use bouquet_invitations::{
    ApprovalFlags, ApprovalState, ApprovalWorkflow, InvitationStore, NewApprovalRequest,
    PgInvitationStore,
};
use common::{complete_owner, TestConfig};
use sqlx::PgPool;
use uuid::Uuid;

async fn store() -> anyhow::Result<Option<PgInvitationStore>> {
    let Some(url) = TestConfig::from_env().database_url else {
        tracing::warn!("TEST_DATABASE_URL not set, skipping Postgres store test");
        return Ok(None);
    };
    let store = PgInvitationStore::new(PgPool::connect(&url).await?);
    store.migrate().await?;
    Ok(Some(store))
}

fn unique_slug() -> String {
    format!("test-{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[test_log::test(tokio::test)]
async fn test_write_read_and_delete() -> anyhow::Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let slug = unique_slug();
    let id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    let created = store
        .write_invitation(id, &slug, &serde_json::json!({"title": "Save the date"}), owner_id)
        .await?;
    assert_eq!(created.approval_state(), Ok(ApprovalState::Draft));

    let found = store.read_invitation(&slug).await?.expect("invitation exists");
    assert_eq!(found.id, id);
    assert_eq!(found.content.0["title"], "Save the date");

    let collision = store
        .write_invitation(Uuid::new_v4(), &slug, &serde_json::json!({}), owner_id)
        .await;
    assert!(matches!(collision, Err(RepositoryError::AlreadyExists)));

    assert!(store.delete_invitation(id).await?);
    assert!(store.get_invitation(id).await?.is_none());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_illegal_flags_rejected_by_schema() -> anyhow::Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let id = Uuid::new_v4();
    store
        .write_invitation(id, &unique_slug(), &serde_json::json!({}), Uuid::new_v4())
        .await?;

    let result = store
        .update_approval(
            id,
            ApprovalFlags {
                is_approved: true,
                is_requesting_approval: true,
            },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidData(_))));

    store.delete_invitation(id).await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_ledger_entry_lifecycle() -> anyhow::Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let owner = complete_owner();
    let slug = unique_slug();
    let record = store
        .write_invitation(Uuid::new_v4(), &slug, &serde_json::json!({}), owner.id)
        .await?;

    let request = NewApprovalRequest::for_invitation(&record, &owner);
    store.create_approval_request(&request).await?;
    let duplicate = store.create_approval_request(&request).await;
    assert!(matches!(duplicate, Err(RepositoryError::AlreadyExists)));

    assert!(store.cancel_approval_request(record.id).await?);
    assert!(!store.cancel_approval_request(record.id).await?);

    store.create_approval_request(&request).await?;
    store.delete_invitation(record.id).await?;
    let remaining = store.list_approval_requests().await?;
    assert!(remaining.iter().all(|entry| entry.invitation_id != record.id));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_workflow_round_trip_on_postgres() -> anyhow::Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    let workflow = ApprovalWorkflow::new(Arc::new(store));
    let owner = complete_owner();
    let admin = bouquet_auth::Actor::admin(Uuid::new_v4());

    let draft = workflow
        .save_content(&owner, &unique_slug(), serde_json::json!({}))
        .await?;
    let pending = workflow.request_approval(&owner, &draft).await?;
    assert!(workflow
        .queue(&admin)
        .await?
        .iter()
        .any(|entry| entry.invitation_id == draft.id));

    let approved = workflow.approve(&admin, &pending).await?;
    assert!(approved.is_approved);
    assert!(!approved.is_requesting_approval);
    assert!(workflow
        .queue(&admin)
        .await?
        .iter()
        .all(|entry| entry.invitation_id != draft.id));

    workflow.delete(&admin, &approved).await?;
    Ok(())
}
