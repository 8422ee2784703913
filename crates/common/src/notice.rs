//! Out-of-band user notices
//!
//! Components publish notices here instead of returning them, so the UI
//! never blocks on error display. Delivery is best effort: a notice emitted
//! with no subscribers is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message delivered outside of return values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: String,
    pub message: String,
    /// Entity the notice is about (invitation, slot or gallery entry)
    pub target: Option<Uuid>,
    pub emitted_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.into(),
            message: message.into(),
            target: None,
            emitted_at: Utc::now(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, code, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, code, message)
    }

    /// Build an error notice from a component error
    pub fn from_error(err: &crate::Error) -> Self {
        Self::error(err.error_code(), err.to_string())
    }

    pub fn with_target(mut self, target: Uuid) -> Self {
        self.target = Some(target);
        self
    }
}

/// Broadcast channel for notices, cloned into every component of a session
#[derive(Debug, Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn emit(&self, notice: Notice) {
        tracing::debug!(code = %notice.code, level = ?notice.level, "Emitting notice");
        if self.sender.send(notice).is_err() {
            tracing::trace!("Notice dropped: no subscribers");
        }
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}
