//! Account secret error types.

use thiserror::Error;

/// Secret handling error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("invalid account secret: {0}")]
    InvalidFormat(String),

    #[error("failed to access secure storage: {0}")]
    AccessFailed(String),

    #[error("failed to retrieve secret: {0}")]
    RetrievalFailed(String),

    #[error("failed to store secret: {0}")]
    StorageFailed(String),

    #[error("failed to delete secret: {0}")]
    DeletionFailed(String),

    #[error("no account secret available")]
    NotAvailable,
}
