//! Command dispatch error types.

use thiserror::Error;

/// Coarse classification of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// Command text was rejected before any network work.
    InvalidCommand,
    /// Another dispatch was already in flight.
    Busy,
    /// Ledger endpoint could not be reached.
    Connection,
    /// Signing, submission or validation was rejected.
    Sign,
    /// The dispatch deadline elapsed.
    Timeout,
    /// The dispatch was cancelled by the caller.
    Cancelled,
}

/// Dispatch error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum DispatchError {
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("another command is still being sent")]
    Busy,

    #[error("failed to connect to ledger: {message}")]
    Connection { message: String },

    #[error("transaction rejected: {message}")]
    Sign {
        message: String,
        engine_result: Option<String>,
    },

    #[error("no confirmation within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Creates invalid command error.
    #[must_use]
    pub fn invalid_command(reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            reason: reason.into(),
        }
    }

    /// Creates connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates signing error without an engine result.
    #[must_use]
    pub fn sign(message: impl Into<String>) -> Self {
        Self::Sign {
            message: message.into(),
            engine_result: None,
        }
    }

    /// Creates signing error carrying the ledger engine result code.
    #[must_use]
    pub fn rejected(engine_result: impl Into<String>, message: impl Into<String>) -> Self {
        let engine_result = engine_result.into();
        Self::Sign {
            message: format!("{engine_result}: {}", message.into()),
            engine_result: Some(engine_result),
        }
    }

    /// Creates timeout error.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timeout(after: std::time::Duration) -> Self {
        Self::Timeout {
            timeout_ms: after.as_millis() as u64,
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> DispatchErrorKind {
        match self {
            Self::InvalidCommand { .. } => DispatchErrorKind::InvalidCommand,
            Self::Busy => DispatchErrorKind::Busy,
            Self::Connection { .. } => DispatchErrorKind::Connection,
            Self::Sign { .. } => DispatchErrorKind::Sign,
            Self::Timeout { .. } => DispatchErrorKind::Timeout,
            Self::Cancelled => DispatchErrorKind::Cancelled,
        }
    }

    /// Returns the engine result code, if the ledger produced one.
    #[must_use]
    pub fn engine_result(&self) -> Option<&str> {
        match self {
            Self::Sign { engine_result, .. } => engine_result.as_deref(),
            _ => None,
        }
    }

    /// Returns whether retrying the same command may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Busy | Self::Connection { .. } | Self::Timeout { .. } | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rejected_keeps_engine_result() {
        let err = DispatchError::rejected("tecUNFUNDED_PAYMENT", "insufficient XRP balance");

        assert_eq!(err.kind(), DispatchErrorKind::Sign);
        assert_eq!(err.engine_result(), Some("tecUNFUNDED_PAYMENT"));
        assert!(err.to_string().contains("tecUNFUNDED_PAYMENT"));
    }

    #[test]
    fn test_timeout_reports_millis() {
        let err = DispatchError::timeout(Duration::from_secs(2));
        assert_eq!(err, DispatchError::Timeout { timeout_ms: 2000 });
    }

    #[test]
    fn test_recoverability() {
        assert!(DispatchError::connection("refused").is_recoverable());
        assert!(DispatchError::Busy.is_recoverable());
        assert!(!DispatchError::sign("bad sequence").is_recoverable());
        assert!(!DispatchError::invalid_command("empty").is_recoverable());
    }
}
