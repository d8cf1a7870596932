//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    AppConfig, DEFAULT_DESTINATION, DEFAULT_ENDPOINT, DeviceConfig, LedgerConfig, LogLevel,
    PaymentConfig, UiConfig,
};
pub use args::{CliArgs, Mode};
pub use storage::{ConfigError, StorageManager};
