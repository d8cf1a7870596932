//! Domain layer with core business entities and port definitions.

/// Connection status definitions.
pub mod connection;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// User-facing alert model.
pub mod notification;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// Key derivation and address encoding.
pub mod services;

pub use connection::ConnectionStatus;
pub use entities::{AccountAddress, AccountSecret, Command, Credentials, DispatchReceipt};
pub use errors::{DispatchError, DispatchErrorKind, SecretError};
pub use notification::{Alert, AlertLevel};
pub use ports::{LedgerPort, LedgerSession, SecretStoragePort};
