//! Device action error types.

use thiserror::Error;

/// Errors raised while running a device action for a received command.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DeviceError {
    #[error("no device action configured for '{command}'")]
    UnknownCommand { command: String },

    #[error("failed to run action for '{command}': {message}")]
    ExecutionFailed { command: String, message: String },

    #[error("action for '{command}' exited with status {code:?}")]
    NonZeroExit { command: String, code: Option<i32> },
}

impl DeviceError {
    /// Creates execution failure error.
    #[must_use]
    pub fn execution_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}
