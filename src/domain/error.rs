//! Error taxonomy shared by every library component.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input. Never worth retrying.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or expired session, or bad credentials.
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    /// The operation would break a business invariant (ownership, uniqueness).
    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("storage deadline exceeded")]
    DeadlineExceeded,

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        LedgerError::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        LedgerError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        LedgerError::Conflict(msg.into())
    }

    /// Machine-stable reason string sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "validation_failed",
            LedgerError::Unauthenticated(_) => "unauthenticated",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Storage(_) => "storage_failure",
            LedgerError::DeadlineExceeded => "deadline_exceeded",
            LedgerError::Catalog(_) => "catalog_unavailable",
            LedgerError::Internal(_) => "internal",
        }
    }

    /// True for failures on our side of the boundary. Their text is for operators only.
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            LedgerError::Storage(_)
                | LedgerError::DeadlineExceeded
                | LedgerError::Catalog(_)
                | LedgerError::Internal(_)
        )
    }
}
