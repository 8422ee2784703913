//! Common state machine error types
//!
//! Shared across all domain crates that implement state machines.

use thiserror::Error;

use crate::error::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Invalid flags: approved={approved}, requesting={requesting}")]
    InvalidFlags { approved: bool, requesting: bool },
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InvalidTransition { .. } | StateError::GuardFailed(_) => {
                Error::Conflict(err.to_string())
            }
            StateError::InvalidFlags { .. } => Error::Internal(err.to_string()),
        }
    }
}
