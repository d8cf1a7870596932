//! Device command value object.

use std::fmt;

use crate::domain::errors::DispatchError;

/// Short command identifier sent to the device, such as `turn_on`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    /// Maximum encoded length of a command.
    pub const MAX_LEN: usize = 256;

    /// Well-known command switching the device on.
    pub const TURN_ON: &'static str = "turn_on";
    /// Well-known command switching the device off.
    pub const TURN_OFF: &'static str = "turn_off";

    /// Creates a validated command.
    ///
    /// # Errors
    /// Returns `InvalidCommand` if the text is empty, padded with whitespace,
    /// too long, or contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DispatchError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DispatchError::invalid_command("command is empty"));
        }
        if value.trim() != value {
            return Err(DispatchError::invalid_command(
                "command has surrounding whitespace",
            ));
        }
        if value.len() > Self::MAX_LEN {
            return Err(DispatchError::invalid_command(format!(
                "command exceeds {} bytes",
                Self::MAX_LEN
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(DispatchError::invalid_command(
                "command contains control characters",
            ));
        }

        Ok(Self(value))
    }

    /// Returns command text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
