//! Mock Transfer Service Implementation
//!
//! Programmable mock for testing upload pipelines:
//! - `MockTransferService`: records every transfer and produces `mock://` references
//! - `MockOutcome`: default result for transfers without a per-file override
//! - `TransferGate`: holds transfers of one file name until released, so tests
//!   can settle uploads in any order

use crate::{validate_namespace, AssetTransferService, DurableRef, TransferError, UploadFile};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// What outcome the mock should produce
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MockOutcome {
    #[default]
    Complete,
    Fail,
}

/// Releases held transfers for one file name
#[derive(Debug, Clone)]
pub struct TransferGate {
    open: Arc<watch::Sender<bool>>,
}

impl TransferGate {
    fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            open: Arc::new(open),
        }
    }

    /// Let every transfer waiting on this gate proceed
    pub fn release(&self) {
        self.open.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// A recorded transfer for test assertions
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransfer {
    pub file_name: String,
    pub namespace: String,
    pub size: u64,
}

#[derive(Debug, Default)]
struct Behavior {
    outcome: MockOutcome,
    failing: HashSet<String>,
    gates: HashMap<String, TransferGate>,
}

/// Mock transfer service with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockTransferService {
    behavior: Arc<Mutex<Behavior>>,
    history: Arc<Mutex<Vec<RecordedTransfer>>>,
    sequence: Arc<AtomicU64>,
}

impl MockTransferService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the default outcome
    pub fn set_outcome(&self, outcome: MockOutcome) {
        self.behavior.lock().unwrap().outcome = outcome;
    }

    /// Make every transfer of `file_name` fail
    pub fn fail_file(&self, file_name: impl Into<String>) {
        self.behavior.lock().unwrap().failing.insert(file_name.into());
    }

    /// Hold transfers of `file_name` until the returned gate is released
    pub fn hold(&self, file_name: impl Into<String>) -> TransferGate {
        let gate = TransferGate::new();
        self.behavior
            .lock()
            .unwrap()
            .gates
            .insert(file_name.into(), gate.clone());
        gate
    }

    /// Get recorded transfers, in call order
    pub fn recorded_transfers(&self) -> Vec<RecordedTransfer> {
        self.history.lock().unwrap().clone()
    }

    /// Reset to default behavior and clear history
    pub fn reset(&self) {
        *self.behavior.lock().unwrap() = Behavior::default();
        self.history.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl AssetTransferService for MockTransferService {
    async fn transfer(
        &self,
        file: &UploadFile,
        namespace: &str,
    ) -> Result<DurableRef, TransferError> {
        validate_namespace(namespace)?;

        self.history
            .lock()
            .map_err(|e| TransferError::Request(format!("history lock poisoned: {e}")))?
            .push(RecordedTransfer {
                file_name: file.name.clone(),
                namespace: namespace.to_string(),
                size: file.size(),
            });

        let (gate, fails) = {
            let behavior = self
                .behavior
                .lock()
                .map_err(|e| TransferError::Request(format!("behavior lock poisoned: {e}")))?;
            (
                behavior.gates.get(&file.name).cloned(),
                behavior.outcome == MockOutcome::Fail || behavior.failing.contains(&file.name),
            )
        };

        if let Some(gate) = gate {
            tracing::debug!(file = %file.name, "Mock storage: holding transfer");
            gate.wait().await;
        }

        if fails {
            tracing::debug!(file = %file.name, "Mock storage: failing transfer");
            return Err(TransferError::Request(format!(
                "mock transfer failed for {}",
                file.name
            )));
        }

        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        Ok(DurableRef(format!("mock://{}/{}#{}", namespace, file.name, n)))
    }
}
