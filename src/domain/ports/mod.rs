//! Port definitions.

mod device_port;
mod ledger_port;
mod ledger_stream_port;
mod notification_port;
mod secret_storage_port;

pub use device_port::DevicePort;
pub use ledger_port::{LedgerPort, LedgerSession};
pub use ledger_stream_port::LedgerStreamPort;
pub use notification_port::NotificationPort;
pub use secret_storage_port::SecretStoragePort;

#[cfg(test)]
pub mod mocks {
    pub use super::device_port::MockDevicePort;
    pub use super::ledger_port::mock::{MockBehaviour, MockLedgerPort};
    pub use super::ledger_stream_port::mock::MockLedgerStream;
    pub use super::notification_port::mock::MockNotificationPort;
    pub use super::secret_storage_port::mock::MockSecretStorage;
}
