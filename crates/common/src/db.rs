//! Shared persistence types for Bouquet
//!
//! Common error type returned by every `InvitationStore` implementation.

use crate::error::Error;
use thiserror::Error;

/// Persistence-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Error::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => Error::Conflict("Record already exists".to_string()),
            RepositoryError::Connection(e) => Error::Storage(e.to_string()),
            RepositoryError::InvalidData(msg) => Error::Validation(msg),
            RepositoryError::Unavailable(msg) => Error::Storage(msg),
        }
    }
}
