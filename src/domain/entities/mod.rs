//! Domain entity definitions.

mod account;
mod command;
mod memo;
mod observed;
mod receipt;
mod secret;
mod transaction;

pub use account::AccountAddress;
pub use command::Command;
pub use memo::{COMMAND_MEMO_TYPE, Memo};
pub use observed::{LedgerEvent, ObservedTransaction, SUCCESS_RESULT};
pub use receipt::{DispatchReceipt, DispatchResult, SubmittedTransaction, TxHash};
pub use secret::{AccountSecret, Credentials, KeyType};
pub use transaction::{Drops, PaymentRoute, TransactionRequest, TransactionType};
