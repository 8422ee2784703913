//! Dashboard coordinator scenarios

mod common;

use bouquet_auth::Actor;
use bouquet_invitations::{
    ActionOutcome, BlockReason, DashboardAction, InvitationStore, ProposalKind, StoreOperation,
};
use common::TestSession;
use uuid::Uuid;

#[test_log::test(tokio::test)]
async fn test_owner_delete_while_pending_is_explained_not_executed() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let owner_desk = session.services.coordinator(session.owner.clone());

    owner_desk.invoke(DashboardAction::RequestApproval, draft);
    let ActionOutcome::Completed(Some(pending)) = owner_desk.confirm().await.unwrap() else {
        panic!("request approval should complete");
    };

    let proposal = owner_desk.invoke(DashboardAction::Delete, pending.clone());
    assert_eq!(
        proposal.kind,
        ProposalKind::InfoOnly {
            blocked: DashboardAction::Delete,
            reason: BlockReason::PendingApproval,
        }
    );
    assert!(proposal.prompt.contains("waiting for approval"));

    assert_eq!(owner_desk.confirm().await.unwrap(), ActionOutcome::Dismissed);
    assert_eq!(session.store.call_count(StoreOperation::DeleteInvitation), 0);
    let stored = session.store.get_invitation(pending.id).await.unwrap();
    assert_eq!(stored, Some(pending));
}

#[test_log::test(tokio::test)]
async fn test_admin_approves_through_dashboard() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let pending = session
        .services
        .workflow
        .request_approval(&session.owner, &draft)
        .await
        .unwrap();

    let admin_desk = session.services.coordinator(session.admin.clone());
    let proposal = admin_desk.invoke(DashboardAction::Approve, pending);
    assert!(matches!(
        proposal.kind,
        ProposalKind::Confirm {
            action: DashboardAction::Approve
        }
    ));

    let ActionOutcome::Completed(Some(approved)) = admin_desk.confirm().await.unwrap() else {
        panic!("approve should complete");
    };
    assert!(approved.is_approved);
    assert!(!approved.is_requesting_approval);
    assert!(session
        .services
        .workflow
        .queue(&session.admin)
        .await
        .unwrap()
        .is_empty());
}

#[test_log::test(tokio::test)]
async fn test_profile_prompt_instead_of_request() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let desk = session.services.coordinator(Actor::owner(session.owner.id));

    let proposal = desk.invoke(DashboardAction::RequestApproval, draft);
    assert!(proposal.is_info_only());
    assert_eq!(desk.confirm().await.unwrap(), ActionOutcome::ProfileRequired);
    assert_eq!(
        session.store.call_count(StoreOperation::CreateApprovalRequest),
        0
    );
}

#[test_log::test(tokio::test)]
async fn test_failed_transition_leaves_action_available() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let pending = session
        .services
        .workflow
        .request_approval(&session.owner, &draft)
        .await
        .unwrap();
    let admin_desk = session.services.coordinator(session.admin.clone());
    let mut notices = session.services.notices.subscribe();

    session.store.fail_on(StoreOperation::CancelApprovalRequest);
    admin_desk.invoke(DashboardAction::Approve, pending.clone());
    assert!(admin_desk.confirm().await.is_err());

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.target, Some(pending.id));
    assert!(!admin_desk.is_busy(pending.id));

    let stored = session.store.get_invitation(pending.id).await.unwrap().unwrap();
    assert!(!stored.is_approved);
    assert!(stored.is_requesting_approval);

    session.store.recover(StoreOperation::CancelApprovalRequest);
    let outcome = admin_desk
        .execute(DashboardAction::Approve, &stored)
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Completed(Some(ref r)) if r.is_approved));
}

#[test_log::test(tokio::test)]
async fn test_busy_target_rejects_second_execute() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let desk = session.services.coordinator(session.owner.clone());
    let gate = session.store.hold(StoreOperation::CreateApprovalRequest);

    let running = tokio::spawn({
        let desk = desk.clone();
        let draft = draft.clone();
        async move { desk.execute(DashboardAction::RequestApproval, &draft).await }
    });
    while !desk.is_busy(draft.id) {
        tokio::task::yield_now().await;
    }

    assert!(desk
        .execute(DashboardAction::RequestApproval, &draft)
        .await
        .is_err());
    assert!(!desk.is_busy(Uuid::new_v4()));

    gate.release();
    assert!(running.await.unwrap().is_ok());
    assert_eq!(
        session
            .services
            .workflow
            .queue(&session.admin)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[test_log::test(tokio::test)]
async fn test_request_opened_on_draft_cannot_demote_after_approval() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let owner_desk = session.services.coordinator(session.owner.clone());

    let proposal = owner_desk.invoke(DashboardAction::RequestApproval, draft.clone());
    assert!(!proposal.is_info_only());
    session
        .services
        .workflow
        .approve(&session.admin, &draft)
        .await
        .unwrap();

    let outcome = owner_desk.confirm().await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Blocked(BlockReason::InvalidState(_))
    ));

    let stored = session.store.get_invitation(draft.id).await.unwrap().unwrap();
    assert!(stored.is_approved);
    assert!(!stored.is_requesting_approval);
    assert_eq!(
        session.store.call_count(StoreOperation::CreateApprovalRequest),
        0
    );
}

#[test_log::test(tokio::test)]
async fn test_delete_opened_on_draft_blocked_once_pending() {
    let session = TestSession::new();
    let draft = session.draft("kim-and-lee").await;
    let owner_desk = session.services.coordinator(session.owner.clone());

    owner_desk.invoke(DashboardAction::Delete, draft.clone());
    session
        .services
        .workflow
        .request_approval(&session.owner, &draft)
        .await
        .unwrap();

    assert_eq!(
        owner_desk.confirm().await.unwrap(),
        ActionOutcome::Blocked(BlockReason::PendingApproval)
    );
    assert_eq!(session.store.call_count(StoreOperation::DeleteInvitation), 0);
    let stored = session.store.get_invitation(draft.id).await.unwrap().unwrap();
    assert!(stored.is_requesting_approval);
}
