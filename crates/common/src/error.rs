//! Common error types and handling for Bouquet

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Bouquet workspace
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Profile incomplete: name and phone are required before requesting approval")]
    ProfileIncomplete,

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error was raised before any side effect took place
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::ProfileIncomplete)
    }

    /// Whether this error came from a persistence or transfer boundary
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Storage(_) | Error::Transfer(_)
        )
    }

    /// Get the stable error code used in notices and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::ProfileIncomplete => "PROFILE_INCOMPLETE",
            Error::Authorization(_) => "AUTHORIZATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Transfer(_) => "TRANSFER_ERROR",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
