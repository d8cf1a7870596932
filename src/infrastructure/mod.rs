//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Command-driven device actions.
pub mod device;
/// Desktop notifications.
pub mod notifications;
/// Secret storage adapters.
pub mod storage;
/// XRP Ledger websocket client.
pub mod xrpl;

pub use config::{AppConfig, CliArgs, LogLevel, Mode, StorageManager};
pub use device::ShellDevice;
pub use notifications::DesktopNotificationService;
pub use storage::KeyringSecretStorage;
pub use xrpl::{AccountSubscriber, SessionConfig, SubscriberConfig, XrplConnector};
