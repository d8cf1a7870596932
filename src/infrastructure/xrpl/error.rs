use std::io;
use thiserror::Error;

use crate::domain::errors::DispatchError;

pub type XrplResult<T> = Result<T, XrplError>;

#[derive(Debug, Error)]
pub enum XrplError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("connection closed with code {code}: {reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    #[error("{error}: {message}")]
    Rpc { error: String, message: String },

    #[error("signing failed: {message}")]
    Signing { message: String },

    #[error("{engine_result}: {message}")]
    Rejected {
        engine_result: String,
        message: String,
    },

    #[error("transaction expired after ledger {last_ledger_sequence}")]
    Expired { last_ledger_sequence: u32 },

    #[error("fee of {fee} drops exceeds limit of {max} drops")]
    FeeTooHigh { fee: u64, max: u64 },

    #[error("timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("not connected to ledger")]
    NotConnected,

    #[error("account stream already running")]
    AlreadyRunning,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl XrplError {
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rpc(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc {
            error: error.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(engine_result: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            engine_result: engine_result.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Returns the rippled error code of an RPC failure.
    #[must_use]
    pub fn rpc_error(&self) -> Option<&str> {
        match self {
            Self::Rpc { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionClosed { .. }
                | Self::WebSocket { .. }
                | Self::Timeout { .. }
                | Self::Io(_)
        )
    }

    /// Returns whether a stream should reconnect after this error.
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        self.is_recoverable()
    }

    /// Returns whether the failure happened on the transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionClosed { .. }
                | Self::WebSocket { .. }
                | Self::NotConnected
                | Self::Io(_)
        )
    }
}

impl From<XrplError> for DispatchError {
    fn from(error: XrplError) -> Self {
        match error {
            XrplError::Rejected {
                engine_result,
                message,
            } => Self::rejected(engine_result, message),
            e if e.is_transport() => Self::connection(e.to_string()),
            e => Self::sign(e.to_string()),
        }
    }
}
