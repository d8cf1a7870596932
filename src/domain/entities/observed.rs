//! Transactions observed on the account stream.

use crate::domain::entities::{AccountAddress, Command, Memo};

/// Engine result of a successfully applied transaction.
pub const SUCCESS_RESULT: &str = "tesSUCCESS";

/// Transaction reported by the ledger stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ObservedTransaction {
    pub hash: Option<String>,
    pub account: String,
    pub transaction_type: String,
    pub engine_result: Option<String>,
    pub validated: bool,
    pub ledger_index: Option<u32>,
    pub memos: Vec<Memo>,
}

impl ObservedTransaction {
    /// Returns whether the transaction was applied in a validated ledger.
    #[must_use]
    pub fn is_final_success(&self) -> bool {
        self.validated && self.engine_result.as_deref() == Some(SUCCESS_RESULT)
    }

    /// Returns the commands this transaction carries for `account`.
    ///
    /// Only validated, successful transactions sent by the account itself
    /// yield commands; anything else, including transactions received from
    /// other senders, yields none.
    #[must_use]
    pub fn commands_from(&self, account: &AccountAddress) -> Vec<Command> {
        if !self.is_final_success() || self.account != account.as_str() {
            return Vec::new();
        }
        self.memos.iter().filter_map(Memo::to_command).collect()
    }
}

/// Events emitted by a ledger stream.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum LedgerEvent {
    Connected { endpoint: String },
    Reconnecting { attempt: u32 },
    Disconnected { reason: String },
    Transaction(Box<ObservedTransaction>),
    Error { message: String, recoverable: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountAddress {
        AccountAddress::from_account_id([1u8; 20])
    }

    fn observed() -> ObservedTransaction {
        ObservedTransaction {
            hash: Some("AB".repeat(32)),
            account: account().to_string(),
            transaction_type: "Payment".to_string(),
            engine_result: Some(SUCCESS_RESULT.to_string()),
            validated: true,
            ledger_index: Some(10),
            memos: vec![
                Memo::from_text("NOTE", "hello"),
                Memo::command(&Command::new("turn_on").unwrap()),
            ],
        }
    }

    #[test]
    fn test_validated_success_yields_commands() {
        let commands = observed().commands_from(&account());
        assert_eq!(commands, vec![Command::new("turn_on").unwrap()]);
    }

    #[test]
    fn test_unvalidated_is_ignored() {
        let mut tx = observed();
        tx.validated = false;
        assert!(tx.commands_from(&account()).is_empty());
    }

    #[test]
    fn test_failed_is_ignored() {
        let mut tx = observed();
        tx.engine_result = Some("tecUNFUNDED_PAYMENT".to_string());
        assert!(tx.commands_from(&account()).is_empty());
    }

    #[test]
    fn test_foreign_sender_is_ignored() {
        let tx = observed();
        let other = AccountAddress::from_account_id([9u8; 20]);
        assert!(tx.commands_from(&other).is_empty());
    }
}
