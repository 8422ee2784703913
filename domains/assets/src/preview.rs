//! Ephemeral previews
//!
//! A preview is shown while a file uploads. Each one is tracked in a registry
//! and released when its handle drops.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bouquet_storage::UploadFile;
use uuid::Uuid;

use crate::domain::entities::AssetRef;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks live previews for a session
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &UploadFile) -> EphemeralPreview {
        let id = Uuid::new_v4();
        lock(&self.live).insert(id);
        tracing::trace!(preview_id = %id, file = %file.name, size = file.size(), "Preview created");
        EphemeralPreview {
            id,
            url: format!("preview://{id}"),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

/// Handle to one preview; dropping it releases the preview
#[derive(Debug)]
pub struct EphemeralPreview {
    id: Uuid,
    url: String,
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl EphemeralPreview {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::Ephemeral(self.url.clone())
    }
}

impl Drop for EphemeralPreview {
    fn drop(&mut self) {
        lock(&self.live).remove(&self.id);
        tracing::trace!(preview_id = %self.id, "Preview released");
    }
}
