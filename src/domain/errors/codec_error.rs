//! Address and seed encoding errors.

use thiserror::Error;

/// Base58Check decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid base58 text: {0}")]
    Base58(String),

    #[error("checksum mismatch")]
    Checksum,

    #[error("unexpected payload: expected {expected} bytes after the version prefix")]
    Payload { expected: usize },
}
