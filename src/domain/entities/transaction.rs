//! Transaction request entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{AccountAddress, Command, Memo};

/// Amount of XRP expressed in drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drops(pub u64);

impl Drops {
    /// Drops in one XRP.
    pub const PER_XRP: u64 = 1_000_000;

    /// Largest representable XRP amount.
    pub const MAX: Self = Self(100_000_000_000 * Self::PER_XRP);

    /// Returns raw drop count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Drops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Direct XRP payment.
    Payment,
}

impl TransactionType {
    /// Returns the binary type code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Payment => 0,
        }
    }

    /// Returns the JSON name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "Payment",
        }
    }
}

/// Fixed payment route every command travels along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRoute {
    /// Sending account.
    pub source: AccountAddress,
    /// Receiving account.
    pub destination: AccountAddress,
    /// Amount transferred per command.
    pub amount: Drops,
    /// Optional destination tag.
    pub destination_tag: Option<u32>,
}

/// Unsigned transaction built for a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TransactionRequest {
    pub transaction_type: TransactionType,
    pub account: AccountAddress,
    pub destination: AccountAddress,
    pub amount: Drops,
    pub destination_tag: Option<u32>,
    pub memos: Vec<Memo>,
}

impl TransactionRequest {
    /// Builds the payment carrying a command memo.
    #[must_use]
    pub fn command_payment(route: &PaymentRoute, command: &Command) -> Self {
        Self {
            transaction_type: TransactionType::Payment,
            account: route.source.clone(),
            destination: route.destination.clone(),
            amount: route.amount,
            destination_tag: route.destination_tag,
            memos: vec![Memo::command(command)],
        }
    }
}
