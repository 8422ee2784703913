//! Bounded, ordered photo gallery
//!
//! Entries keep a stable id for their whole life; position is the order of
//! the collection. A batch is staged all at once (previews appear immediately)
//! and uploaded one file at a time. Removing an entry while its upload is in
//! flight turns the completion into a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bouquet_common::{Error, Notice, Result};
use bouquet_storage::{validate_namespace, DurableRef, TransferError, UploadFile};
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::entities::AssetRef;
use crate::pipeline::PipelineContext;
use crate::preview::EphemeralPreview;
use crate::slot::SubmitOutcome;

/// Maximum number of photos in a gallery
pub const GALLERY_CAPACITY: usize = 30;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: Uuid,
    pub value: AssetRef,
    pub pending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GallerySnapshot {
    pub items: Vec<GalleryItem>,
}

impl GallerySnapshot {
    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Result of `add`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Ids given to the accepted files, in order
    pub accepted: Vec<Uuid>,
    pub stored: Vec<Uuid>,
    pub failed: Vec<Uuid>,
    /// Valid files dropped because the gallery was full
    pub truncated: usize,
    /// Names of files that failed validation
    pub rejected: Vec<String>,
}

/// Keyboard equivalents of drag reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    First,
    Last,
}

#[derive(Debug)]
struct Entry {
    id: Uuid,
    token: u64,
    committed: Option<DurableRef>,
    preview: Option<EphemeralPreview>,
}

impl Entry {
    fn item(&self) -> Option<GalleryItem> {
        let (value, pending) = match (&self.preview, &self.committed) {
            (Some(preview), _) => (preview.asset_ref(), true),
            (None, Some(committed)) => (AssetRef::Durable(committed.clone()), false),
            (None, None) => return None,
        };
        Some(GalleryItem {
            id: self.id,
            value,
            pending,
        })
    }
}

#[derive(Debug, Default)]
struct Entries(Vec<Entry>);

impl Entries {
    fn position(&self, id: Uuid) -> Option<usize> {
        self.0.iter().position(|entry| entry.id == id)
    }

    fn snapshot(&self) -> GallerySnapshot {
        GallerySnapshot {
            items: self.0.iter().filter_map(Entry::item).collect(),
        }
    }

    /// Move the entry at `from` to `to`, clamped to the last position
    fn relocate(&mut self, from: usize, to: usize) {
        let entry = self.0.remove(from);
        let to = to.min(self.0.len());
        self.0.insert(to, entry);
    }
}

struct Staged {
    id: Uuid,
    token: u64,
    file: UploadFile,
}

enum Settled {
    Stored(DurableRef),
    Failed(TransferError),
    /// Entry removed or re-submitted meanwhile
    Discarded,
}

#[derive(Clone)]
pub struct GalleryCollection {
    namespace: String,
    context: PipelineContext,
    entries: Arc<Mutex<Entries>>,
    view: Arc<watch::Sender<GallerySnapshot>>,
}

impl GalleryCollection {
    pub fn new(namespace: impl Into<String>, context: PipelineContext) -> Result<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;

        let (view, _) = watch::channel(GallerySnapshot::default());
        Ok(Self {
            namespace,
            context,
            entries: Arc::new(Mutex::new(Entries::default())),
            view: Arc::new(view),
        })
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GallerySnapshot> {
        self.view.subscribe()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= GALLERY_CAPACITY
    }

    /// Durable references in gallery order, for saving into invitation content
    pub fn durable_refs(&self) -> Vec<DurableRef> {
        lock(&self.entries)
            .0
            .iter()
            .filter_map(|entry| entry.committed.clone())
            .collect()
    }

    /// Replace the whole gallery with saved references. In-flight uploads
    /// are discarded when they settle.
    pub fn hydrate(&self, refs: Vec<DurableRef>) {
        let mut entries = lock(&self.entries);
        entries.0 = refs
            .into_iter()
            .take(GALLERY_CAPACITY)
            .map(|durable| Entry {
                id: Uuid::new_v4(),
                token: 0,
                committed: Some(durable),
                preview: None,
            })
            .collect();
        self.view.send_replace(entries.snapshot());
    }

    /// Add a batch of photos.
    ///
    /// Invalid files are skipped and reported. Files beyond the remaining
    /// capacity are dropped, never queued. Accepted files appear at once as
    /// previews and then upload one after another; a failed upload removes
    /// only its own entry.
    pub async fn add(&self, files: Vec<UploadFile>) -> AddReport {
        let (staged, mut report) = self.stage(files);

        for Staged { id, token, file } in staged {
            let result = self.context.transfer.transfer(&file, &self.namespace).await;
            match self.settle(id, token, &file, result) {
                Settled::Stored(_) => report.stored.push(id),
                Settled::Failed(_) => report.failed.push(id),
                Settled::Discarded => {}
            }
        }

        tracing::info!(
            namespace = %self.namespace,
            accepted = report.accepted.len(),
            stored = report.stored.len(),
            failed = report.failed.len(),
            truncated = report.truncated,
            "Gallery batch settled"
        );
        report
    }

    fn stage(&self, files: Vec<UploadFile>) -> (Vec<Staged>, AddReport) {
        let mut report = AddReport::default();
        let mut valid = Vec::with_capacity(files.len());
        for file in files {
            match self.context.rules.validate(&file) {
                Ok(()) => valid.push(file),
                Err(e) => {
                    self.context
                        .notices
                        .emit(Notice::warning("INVALID_FILE", e.to_string()));
                    report.rejected.push(file.name);
                }
            }
        }

        let requested = valid.len();
        let mut staged = Vec::with_capacity(requested);
        {
            let mut entries = lock(&self.entries);
            let remaining = GALLERY_CAPACITY.saturating_sub(entries.0.len());
            if requested > remaining {
                report.truncated = requested - remaining;
                valid.truncate(remaining);
            }

            for file in valid {
                let id = Uuid::new_v4();
                entries.0.push(Entry {
                    id,
                    token: 1,
                    committed: None,
                    preview: Some(self.context.previews.create(&file)),
                });
                report.accepted.push(id);
                staged.push(Staged { id, token: 1, file });
            }
            self.view.send_replace(entries.snapshot());
        }

        if report.truncated > 0 {
            tracing::warn!(
                namespace = %self.namespace,
                requested,
                truncated = report.truncated,
                "Gallery full, dropping files"
            );
            self.context.notices.emit(Notice::warning(
                "GALLERY_TRUNCATED",
                format!(
                    "Only {} of {} photos were added. A gallery holds at most {} photos.",
                    report.accepted.len(),
                    requested,
                    GALLERY_CAPACITY
                ),
            ));
        }

        (staged, report)
    }

    fn settle(
        &self,
        id: Uuid,
        token: u64,
        file: &UploadFile,
        result: std::result::Result<DurableRef, TransferError>,
    ) -> Settled {
        let mut entries = lock(&self.entries);
        let Some(index) = entries.position(id) else {
            tracing::debug!(entry_id = %id, "Upload settled for removed entry");
            return Settled::Discarded;
        };
        if entries.0[index].token != token {
            tracing::debug!(entry_id = %id, token, "Discarding stale upload");
            return Settled::Discarded;
        }

        let settled = match result {
            Ok(durable) => {
                let entry = &mut entries.0[index];
                entry.preview = None;
                entry.committed = Some(durable.clone());
                Settled::Stored(durable)
            }
            Err(error) => {
                tracing::warn!(entry_id = %id, file = %file.name, error = %error, "Gallery upload failed");
                let entry = &mut entries.0[index];
                entry.preview = None;
                let message = if entry.committed.is_some() {
                    format!("Could not upload {}. The previous photo was kept.", file.name)
                } else {
                    entries.0.remove(index);
                    format!("Could not upload {}. It was removed from the gallery.", file.name)
                };
                self.context
                    .notices
                    .emit(Notice::warning("UPLOAD_FAILED", message).with_target(id));
                Settled::Failed(error)
            }
        };

        self.view.send_replace(entries.snapshot());
        settled
    }

    /// Remove an entry, pending or not. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut entries = lock(&self.entries);
        let Some(index) = entries.position(id) else {
            return false;
        };
        entries.0.remove(index);
        self.view.send_replace(entries.snapshot());
        tracing::debug!(entry_id = %id, "Gallery entry removed");
        true
    }

    /// Move an entry to `new_index`. Silently does nothing for an unknown id.
    pub fn reorder(&self, id: Uuid, new_index: usize) -> bool {
        let mut entries = lock(&self.entries);
        let Some(index) = entries.position(id) else {
            return false;
        };
        entries.relocate(index, new_index);
        self.view.send_replace(entries.snapshot());
        true
    }

    /// Keyboard reordering
    pub fn move_by(&self, id: Uuid, direction: MoveDirection) -> bool {
        let mut entries = lock(&self.entries);
        let Some(index) = entries.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up => index.saturating_sub(1),
            MoveDirection::Down => index + 1,
            MoveDirection::First => 0,
            MoveDirection::Last => usize::MAX,
        };
        entries.relocate(index, target);
        self.view.send_replace(entries.snapshot());
        true
    }

    /// Re-upload one entry in place, keeping its id and position.
    ///
    /// Same last-submit-wins rule as `AssetSlot::submit`. On failure the entry
    /// goes back to its previous photo, or is removed if it never had one.
    pub async fn replace(&self, id: Uuid, file: UploadFile) -> Result<SubmitOutcome> {
        self.context.rules.validate(&file)?;

        let token = {
            let mut entries = lock(&self.entries);
            let index = entries
                .position(id)
                .ok_or_else(|| Error::NotFound(format!("Gallery entry {id} not found")))?;
            let entry = &mut entries.0[index];
            entry.token += 1;
            entry.preview = Some(self.context.previews.create(&file));
            let token = entry.token;
            self.view.send_replace(entries.snapshot());
            token
        };

        let result = self.context.transfer.transfer(&file, &self.namespace).await;
        Ok(match self.settle(id, token, &file, result) {
            Settled::Stored(durable) => SubmitOutcome::Stored(durable),
            Settled::Failed(error) => SubmitOutcome::Reverted { error },
            Settled::Discarded => SubmitOutcome::Superseded,
        })
    }
}
