//! Dispatch outcome entities.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::entities::Command;
use crate::domain::errors::DispatchError;

/// Transaction hash as 64 uppercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    /// Creates hash from hex text, normalizing case.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(value.to_ascii_uppercase()))
    }

    /// Creates hash from the 32 raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    /// Returns hash text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns abbreviated hash for narrow displays.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..8], &self.0[56..])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome reported by a ledger session for one signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub engine_result: String,
    /// Ledger the transaction was validated in, when validation was awaited.
    pub ledger_index: Option<u32>,
}

/// Successful dispatch report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DispatchReceipt {
    pub command: Command,
    pub hash: TxHash,
    pub engine_result: String,
    pub ledger_index: Option<u32>,
    pub submitted_at: DateTime<Utc>,
}

impl DispatchReceipt {
    /// Combines a command with its submitted transaction.
    #[must_use]
    pub fn new(command: Command, submitted: SubmittedTransaction) -> Self {
        Self {
            command,
            hash: submitted.hash,
            engine_result: submitted.engine_result,
            ledger_index: submitted.ledger_index,
            submitted_at: Utc::now(),
        }
    }

    /// Returns whether the transaction was seen in a validated ledger.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        self.ledger_index.is_some()
    }
}

/// Result of one dispatch.
pub type DispatchResult = Result<DispatchReceipt, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "e08d6e9754025ba2534a78707605e0601f03acE063687A0CA1BDDACFCD1698C7";

    #[test]
    fn test_hash_normalizes_case() {
        let hash = TxHash::new(HASH).unwrap();
        assert_eq!(hash.as_str(), HASH.to_ascii_uppercase());
        assert_eq!(hash.short(), "E08D6E97…CD1698C7");
    }

    #[test]
    fn test_hash_rejects_bad_input() {
        assert!(TxHash::new("").is_none());
        assert!(TxHash::new("ABCD").is_none());
        assert!(TxHash::new("Z".repeat(64)).is_none());
    }

    #[test]
    fn test_receipt_from_submission() {
        let receipt = DispatchReceipt::new(
            Command::new("turn_on").unwrap(),
            SubmittedTransaction {
                hash: TxHash::from_bytes(&[0xAB; 32]),
                engine_result: "tesSUCCESS".to_string(),
                ledger_index: Some(42),
            },
        );

        assert!(receipt.is_validated());
        assert_eq!(receipt.hash.as_str(), "AB".repeat(32));
        assert_eq!(receipt.command.as_str(), "turn_on");
    }
}
