//! Approval lifecycle scenarios against the assembled services

mod common;

use bouquet_auth::Actor;
use bouquet_common::Error;
use bouquet_invitations::{ApprovalState, InvitationStore, StoreOperation};
use common::TestSession;

#[test_log::test(tokio::test)]
async fn test_request_approval_from_draft() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    assert!(!draft.is_approved);
    assert!(!draft.is_requesting_approval);

    let pending = session
        .services
        .workflow
        .request_approval(&session.owner, &draft)
        .await
        .unwrap();

    assert!(pending.is_requesting_approval);
    assert!(!pending.is_approved);

    let queue = session.services.workflow.queue(&session.admin).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].invitation_id, draft.id);
    assert_eq!(queue[0].invitation_slug, "kim-and-lee");
}

#[test_log::test(tokio::test)]
async fn test_incomplete_profile_never_touches_ledger() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let bare_owner = Actor::owner(session.owner.id);

    let err = session
        .services
        .workflow
        .request_approval(&bare_owner, &draft)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProfileIncomplete));

    assert!(session
        .services
        .workflow
        .queue(&session.admin)
        .await
        .unwrap()
        .is_empty());
    let stored = session.store.get_invitation(draft.id).await.unwrap().unwrap();
    assert!(!stored.is_requesting_approval);
}

#[test_log::test(tokio::test)]
async fn test_approve_pending_clears_queue() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let workflow = &session.services.workflow;
    let pending = workflow.request_approval(&session.owner, &draft).await.unwrap();

    let approved = workflow.approve(&session.admin, &pending).await.unwrap();
    assert!(approved.is_approved);
    assert!(!approved.is_requesting_approval);
    assert!(workflow.queue(&session.admin).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_approve_is_absorbing_regardless_of_request_flag() {
    let session = TestSession::new();
    let workflow = &session.services.workflow;

    let draft = session.draft("draft-one").await;
    let from_draft = workflow.approve(&session.admin, &draft).await.unwrap();

    let other = session.draft("pending-one").await;
    let pending = workflow.request_approval(&session.owner, &other).await.unwrap();
    let from_pending = workflow.approve(&session.admin, &pending).await.unwrap();

    let again = workflow.approve(&session.admin, &from_pending).await.unwrap();

    for record in [from_draft, from_pending, again] {
        assert_eq!(record.approval_state(), Ok(ApprovalState::Approved));
        assert!(record.is_approved);
        assert!(!record.is_requesting_approval);
    }
}

#[test_log::test(tokio::test)]
async fn test_cancel_twice_without_entry_succeeds() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let workflow = &session.services.workflow;

    let first = workflow.cancel_request(&session.owner, draft.id).await.unwrap();
    let second = workflow.cancel_request(&session.owner, draft.id).await.unwrap();

    assert!(!first.unwrap().is_requesting_approval);
    assert!(!second.unwrap().is_requesting_approval);
}

#[test_log::test(tokio::test)]
async fn test_failed_request_reports_error_and_leaves_no_entry() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    session.store.fail_on(StoreOperation::UpdateApproval);

    let result = session
        .services
        .workflow
        .request_approval(&session.owner, &draft)
        .await;
    assert!(result.is_err());

    session.store.recover(StoreOperation::UpdateApproval);
    assert!(session
        .services
        .workflow
        .queue(&session.admin)
        .await
        .unwrap()
        .is_empty());
    let stored = session.store.get_invitation(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.approval_state(), Ok(ApprovalState::Draft));
}

#[test_log::test(tokio::test)]
async fn test_owner_edits_resume_after_reject() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let workflow = &session.services.workflow;
    let pending = workflow.request_approval(&session.owner, &draft).await.unwrap();

    let blocked = workflow
        .save_content(&session.owner, "kim-and-lee", serde_json::json!({"venue": "Seoul"}))
        .await;
    assert!(matches!(blocked, Err(Error::Conflict(_))));

    workflow.reject(&session.admin, &pending).await.unwrap();
    let edited = workflow
        .save_content(&session.owner, "kim-and-lee", serde_json::json!({"venue": "Seoul"}))
        .await
        .unwrap();
    assert_eq!(edited.content.0["venue"], "Seoul");
}
