//! Transaction memo entity.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Command;

/// Memo type marking a device command.
pub const COMMAND_MEMO_TYPE: &str = "IOT_COMMAND";

/// Memo attached to a transaction.
///
/// Type and data hold uppercase hex of UTF-8 text, the representation the
/// ledger stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    #[serde(rename = "MemoType", default, skip_serializing_if = "Option::is_none")]
    memo_type: Option<String>,
    #[serde(rename = "MemoData", default, skip_serializing_if = "Option::is_none")]
    memo_data: Option<String>,
    #[serde(rename = "MemoFormat", default, skip_serializing_if = "Option::is_none")]
    memo_format: Option<String>,
}

impl Memo {
    /// Creates memo from plain text type and data.
    #[must_use]
    pub fn from_text(memo_type: &str, memo_data: &str) -> Self {
        Self {
            memo_type: Some(hex::encode_upper(memo_type)),
            memo_data: Some(hex::encode_upper(memo_data)),
            memo_format: None,
        }
    }

    /// Creates memo from hex fields as found on the ledger.
    #[must_use]
    pub fn from_hex(memo_type: Option<String>, memo_data: Option<String>) -> Self {
        Self {
            memo_type,
            memo_data,
            memo_format: None,
        }
    }

    /// Creates the `IOT_COMMAND` memo for a command.
    #[must_use]
    pub fn command(command: &Command) -> Self {
        Self::from_text(COMMAND_MEMO_TYPE, command.as_str())
    }

    /// Returns memo type hex.
    #[must_use]
    pub fn memo_type_hex(&self) -> Option<&str> {
        self.memo_type.as_deref()
    }

    /// Returns memo data hex.
    #[must_use]
    pub fn memo_data_hex(&self) -> Option<&str> {
        self.memo_data.as_deref()
    }

    /// Returns memo format hex.
    #[must_use]
    pub fn memo_format_hex(&self) -> Option<&str> {
        self.memo_format.as_deref()
    }

    /// Decodes memo type as text.
    #[must_use]
    pub fn decoded_type(&self) -> Option<String> {
        self.memo_type.as_deref().and_then(decode_hex_text)
    }

    /// Decodes memo data as text.
    #[must_use]
    pub fn decoded_data(&self) -> Option<String> {
        self.memo_data.as_deref().and_then(decode_hex_text)
    }

    /// Returns whether this memo carries a device command.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.decoded_type().as_deref() == Some(COMMAND_MEMO_TYPE)
    }

    /// Extracts the command carried by this memo.
    #[must_use]
    pub fn to_command(&self) -> Option<Command> {
        if !self.is_command() {
            return None;
        }
        self.decoded_data().and_then(|data| Command::new(data).ok())
    }
}

fn decode_hex_text(value: &str) -> Option<String> {
    let bytes = hex::decode(value).ok()?;
    String::from_utf8(bytes).ok()
}
