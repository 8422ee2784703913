//! Single-image slot with optimistic upload
//!
//! `submit` publishes a preview immediately, transfers the file, then settles
//! the slot with the durable reference or reverts it to the last committed
//! one. Every submit takes a new token; a completion whose token is no longer
//! current is discarded, so only the latest submit is ever observable.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bouquet_common::{Notice, Result};
use bouquet_storage::{validate_namespace, DurableRef, TransferError, UploadFile};
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::entities::AssetRef;
use crate::pipeline::PipelineContext;
use crate::preview::EphemeralPreview;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the UI renders for a slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub value: Option<AssetRef>,
    pub pending: bool,
}

/// How a submit settled
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Stored(DurableRef),
    /// A later submit or clear took over; this result was discarded
    Superseded,
    /// Transfer failed and the previous value was restored
    Reverted { error: TransferError },
}

#[derive(Debug, Default)]
struct SlotState {
    token: u64,
    committed: Option<DurableRef>,
    preview: Option<EphemeralPreview>,
}

impl SlotState {
    fn snapshot(&self) -> SlotSnapshot {
        match &self.preview {
            Some(preview) => SlotSnapshot {
                value: Some(preview.asset_ref()),
                pending: true,
            },
            None => SlotSnapshot {
                value: self.committed.clone().map(AssetRef::Durable),
                pending: false,
            },
        }
    }
}

#[derive(Clone)]
pub struct AssetSlot {
    id: Uuid,
    namespace: String,
    context: PipelineContext,
    state: Arc<Mutex<SlotState>>,
    view: Arc<watch::Sender<SlotSnapshot>>,
}

impl AssetSlot {
    /// Empty slot uploading under `namespace`
    pub fn new(namespace: impl Into<String>, context: PipelineContext) -> Result<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;

        let (view, _) = watch::channel(SlotSnapshot::default());
        Ok(Self {
            id: Uuid::new_v4(),
            namespace,
            context,
            state: Arc::new(Mutex::new(SlotState::default())),
            view: Arc::new(view),
        })
    }

    /// Slot seeded with a previously saved reference
    pub fn with_value(
        namespace: impl Into<String>,
        context: PipelineContext,
        value: Option<DurableRef>,
    ) -> Result<Self> {
        let slot = Self::new(namespace, context)?;
        slot.hydrate(value);
        Ok(slot)
    }

    #[mutants::skip] // Plain accessor
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SlotSnapshot> {
        self.view.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.view.borrow().pending
    }

    /// Last reference that reached durable storage
    pub fn durable_value(&self) -> Option<DurableRef> {
        lock(&self.state).committed.clone()
    }

    /// Replace the slot value with `file`.
    ///
    /// Only validation errors are returned as `Err`; a failed transfer reverts
    /// the slot, emits an `UPLOAD_FAILED` notice and returns `Reverted`.
    pub async fn submit(&self, file: UploadFile) -> Result<SubmitOutcome> {
        self.context.rules.validate(&file)?;

        let token = {
            let preview = self.context.previews.create(&file);
            let mut state = lock(&self.state);
            state.token += 1;
            state.preview = Some(preview);
            self.view.send_replace(state.snapshot());
            state.token
        };

        let result = self
            .context
            .transfer
            .transfer(&file, &self.namespace)
            .await;

        let mut state = lock(&self.state);
        if state.token != token {
            tracing::debug!(slot_id = %self.id, token, current = state.token, "Discarding stale upload");
            return Ok(SubmitOutcome::Superseded);
        }

        state.preview = None;
        let outcome = match result {
            Ok(durable) => {
                tracing::info!(slot_id = %self.id, reference = %durable, "Upload stored");
                state.committed = Some(durable.clone());
                SubmitOutcome::Stored(durable)
            }
            Err(error) => {
                tracing::warn!(slot_id = %self.id, file = %file.name, error = %error, "Upload failed, reverting");
                self.context.notices.emit(
                    Notice::warning(
                        "UPLOAD_FAILED",
                        format!("Could not upload {}. The previous image was kept.", file.name),
                    )
                    .with_target(self.id),
                );
                SubmitOutcome::Reverted { error }
            }
        };
        self.view.send_replace(state.snapshot());
        Ok(outcome)
    }

    /// Remove the value. Any in-flight submit is discarded when it settles.
    /// The remote object is left in place.
    pub fn clear(&self) {
        self.hydrate(None);
    }

    /// Set the committed value directly, invalidating any in-flight submit
    pub fn hydrate(&self, value: Option<DurableRef>) {
        let mut state = lock(&self.state);
        state.token += 1;
        state.preview = None;
        state.committed = value;
        self.view.send_replace(state.snapshot());
    }
}
