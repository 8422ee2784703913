//! In-memory invitation store
//!
//! Mirrors the Postgres constraints (unique slug, one ledger entry per
//! invitation, no approved+requesting rows) and adds programmable failures
//! and gates for exercising rollback paths. Thread-safe via `Arc<Mutex<>>`.

use bouquet_common::RepositoryError;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use uuid::Uuid;

use super::InvitationStore;
use crate::domain::entities::{ApprovalRequest, InvitationRecord, NewApprovalRequest};
use crate::domain::state::{ApprovalFlags, ApprovalState};

/// Store operations that can be failed or held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ReadInvitation,
    GetInvitation,
    WriteInvitation,
    UpdateApproval,
    DeleteInvitation,
    ListApprovalRequests,
    CreateApprovalRequest,
    CancelApprovalRequest,
}

/// Releases held calls of one operation
#[derive(Debug, Clone)]
pub struct StoreGate {
    open: Arc<watch::Sender<bool>>,
}

impl StoreGate {
    fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            open: Arc::new(open),
        }
    }

    pub fn release(&self) {
        self.open.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[derive(Debug, Default)]
struct Tables {
    invitations: HashMap<Uuid, InvitationRecord>,
    ledger: Vec<ApprovalRequest>,
}

#[derive(Debug, Default)]
struct Behavior {
    failing: HashSet<StoreOperation>,
    gates: HashMap<StoreOperation, StoreGate>,
    calls: HashMap<StoreOperation, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryInvitationStore {
    tables: Arc<Mutex<Tables>>,
    behavior: Arc<Mutex<Behavior>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `operation` fail until `recover` is called
    pub fn fail_on(&self, operation: StoreOperation) {
        lock(&self.behavior).failing.insert(operation);
    }

    pub fn recover(&self, operation: StoreOperation) {
        lock(&self.behavior).failing.remove(&operation);
    }

    /// Hold calls of `operation` until the returned gate is released
    pub fn hold(&self, operation: StoreOperation) -> StoreGate {
        let gate = StoreGate::new();
        lock(&self.behavior).gates.insert(operation, gate.clone());
        gate
    }

    /// Number of calls made to `operation`, including failed ones
    pub fn call_count(&self, operation: StoreOperation) -> usize {
        lock(&self.behavior)
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Seed a record as-is, bypassing validation (fixtures)
    pub fn insert(&self, record: InvitationRecord) {
        lock(&self.tables).invitations.insert(record.id, record);
    }

    async fn enter(&self, operation: StoreOperation) -> Result<(), RepositoryError> {
        let (gate, fails) = {
            let mut behavior = lock(&self.behavior);
            *behavior.calls.entry(operation).or_insert(0) += 1;
            (
                behavior.gates.get(&operation).cloned(),
                behavior.failing.contains(&operation),
            )
        };

        if let Some(gate) = gate {
            gate.wait().await;
        }

        if fails {
            tracing::debug!(?operation, "In-memory store: failing operation");
            return Err(RepositoryError::Unavailable(format!(
                "{operation:?} failed"
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvitationStore for InMemoryInvitationStore {
    async fn read_invitation(
        &self,
        slug: &str,
    ) -> Result<Option<InvitationRecord>, RepositoryError> {
        self.enter(StoreOperation::ReadInvitation).await?;
        Ok(lock(&self.tables)
            .invitations
            .values()
            .find(|record| record.slug == slug)
            .cloned())
    }

    async fn get_invitation(&self, id: Uuid) -> Result<Option<InvitationRecord>, RepositoryError> {
        self.enter(StoreOperation::GetInvitation).await?;
        Ok(lock(&self.tables).invitations.get(&id).cloned())
    }

    async fn write_invitation(
        &self,
        id: Uuid,
        slug: &str,
        content: &serde_json::Value,
        owner_id: Uuid,
    ) -> Result<InvitationRecord, RepositoryError> {
        self.enter(StoreOperation::WriteInvitation).await?;
        let mut tables = lock(&self.tables);

        if tables
            .invitations
            .values()
            .any(|record| record.slug == slug && record.id != id)
        {
            return Err(RepositoryError::AlreadyExists);
        }

        let now = Utc::now();
        let record = tables
            .invitations
            .entry(id)
            .and_modify(|record| {
                record.slug = slug.to_string();
                record.content = sqlx::types::Json(content.clone());
                record.updated_at = now;
            })
            .or_insert_with(|| InvitationRecord {
                id,
                slug: slug.to_string(),
                owner_id,
                content: sqlx::types::Json(content.clone()),
                is_approved: false,
                is_requesting_approval: false,
                created_at: now,
                updated_at: now,
            });

        Ok(record.clone())
    }

    async fn update_approval(
        &self,
        id: Uuid,
        flags: ApprovalFlags,
    ) -> Result<Option<InvitationRecord>, RepositoryError> {
        self.enter(StoreOperation::UpdateApproval).await?;
        let state = ApprovalState::from_flags(flags)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        let mut tables = lock(&self.tables);
        Ok(tables.invitations.get_mut(&id).map(|record| {
            record.set_state(state);
            record.clone()
        }))
    }

    async fn delete_invitation(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.enter(StoreOperation::DeleteInvitation).await?;
        let mut tables = lock(&self.tables);
        let removed = tables.invitations.remove(&id).is_some();
        if removed {
            tables.ledger.retain(|entry| entry.invitation_id != id);
        }
        Ok(removed)
    }

    async fn list_approval_requests(&self) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        self.enter(StoreOperation::ListApprovalRequests).await?;
        let mut requests = lock(&self.tables).ledger.clone();
        requests.sort_by_key(|entry| entry.created_at);
        Ok(requests)
    }

    async fn create_approval_request(
        &self,
        request: &NewApprovalRequest,
    ) -> Result<ApprovalRequest, RepositoryError> {
        self.enter(StoreOperation::CreateApprovalRequest).await?;
        let mut tables = lock(&self.tables);

        if !tables.invitations.contains_key(&request.invitation_id) {
            return Err(RepositoryError::InvalidData(format!(
                "invitation {} does not exist",
                request.invitation_id
            )));
        }
        if tables
            .ledger
            .iter()
            .any(|entry| entry.invitation_id == request.invitation_id)
        {
            return Err(RepositoryError::AlreadyExists);
        }

        let entry = request.clone().into_request();
        tables.ledger.push(entry.clone());
        Ok(entry)
    }

    async fn cancel_approval_request(&self, invitation_id: Uuid) -> Result<bool, RepositoryError> {
        self.enter(StoreOperation::CancelApprovalRequest).await?;
        let mut tables = lock(&self.tables);
        let before = tables.ledger.len();
        tables.ledger.retain(|entry| entry.invitation_id != invitation_id);
        Ok(tables.ledger.len() != before)
    }
}
