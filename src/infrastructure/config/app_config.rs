//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::storage::ConfigError;
use crate::domain::entities::{AccountAddress, Drops, PaymentRoute};

pub(crate) const APP_NAME: &str = "xrpl-iot";
pub(crate) const APP_QUALIFIER: &str = "net";
pub(crate) const APP_ORGANIZATION: &str = "xrpl-iot";

/// Public test network websocket endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://s.altnet.rippletest.net:51233";

/// Account that receives every command payment by default.
pub const DEFAULT_DESTINATION: &str = "rpEPpEr5ED6NzykYunBEJJoMdfjp1t3uf4";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Source account. Derived from the secret when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Enable desktop notifications.
    #[serde(default = "default_true")]
    pub enable_desktop_notifications: bool,

    /// Ledger connection settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Command payment settings.
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Device actions run by the listener.
    #[serde(default)]
    pub device: DeviceConfig,

    /// UI configuration.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Ledger connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Websocket endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upper bound for one dispatch, connection included, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Ledgers a transaction may wait before it expires.
    #[serde(default = "default_ledger_offset")]
    pub ledger_offset: u32,

    /// Highest fee a dispatch will pay, in drops.
    #[serde(default = "default_max_fee_drops")]
    pub max_fee_drops: u64,

    /// Wait until the transaction is in a validated ledger.
    #[serde(default = "default_true")]
    pub wait_for_validation: bool,

    /// Delay between validation checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl LedgerConfig {
    /// Returns the dispatch timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the validation poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            ledger_offset: default_ledger_offset(),
            max_fee_drops: default_max_fee_drops(),
            wait_for_validation: true,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Command payment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Receiving account.
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Amount sent with each command, in drops.
    #[serde(default = "default_amount_drops")]
    pub amount_drops: u64,

    /// Optional destination tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            amount_drops: default_amount_drops(),
            destination_tag: None,
        }
    }
}

/// Device actions keyed by command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Program and arguments run for each command.
    #[serde(default)]
    pub commands: BTreeMap<String, Vec<String>>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let commands = [("turn_on", "LED on"), ("turn_off", "LED off")]
            .into_iter()
            .map(|(command, text)| {
                (
                    command.to_string(),
                    vec!["echo".to_string(), text.to_string()],
                )
            })
            .collect();
        Self { commands }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Label of the first button.
    #[serde(default = "default_on_label")]
    pub on_label: String,

    /// Label of the second button.
    #[serde(default = "default_off_label")]
    pub off_label: String,

    /// Enable mouse support.
    #[serde(default = "default_true")]
    pub mouse: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            on_label: default_on_label(),
            off_label: default_off_label(),
            mouse: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ledger_offset() -> u32 {
    20
}

fn default_max_fee_drops() -> u64 {
    2_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

fn default_amount_drops() -> u64 {
    100
}

fn default_on_label() -> String {
    "Turn On Led".to_string()
}

fn default_off_label() -> String {
    "Turn Off Led".to_string()
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(endpoint) = &args.endpoint {
            self.ledger.endpoint.clone_from(endpoint);
        }
        if let Some(account) = &args.account {
            self.account = Some(account.clone());
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.ledger.timeout_secs = timeout_secs;
        }
        if let Some(notifications) = args.enable_desktop_notifications {
            self.enable_desktop_notifications = notifications;
        }
        if let Some(mouse) = args.mouse {
            self.ui.mouse = mouse;
        }
    }

    /// Parses the configured source account.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the address is malformed.
    pub fn account_address(&self) -> Result<Option<AccountAddress>, ConfigError> {
        self.account
            .as_deref()
            .map(|account| {
                AccountAddress::parse(account)
                    .map_err(|e| ConfigError::invalid("account", e.to_string()))
            })
            .transpose()
    }

    /// Builds the payment route for commands sent from `source`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a malformed destination or amount,
    /// or when the destination is the sending account itself.
    pub fn payment_route(&self, source: AccountAddress) -> Result<PaymentRoute, ConfigError> {
        let destination = AccountAddress::parse(&self.payment.destination)
            .map_err(|e| ConfigError::invalid("payment.destination", e.to_string()))?;
        if destination == source {
            return Err(ConfigError::invalid(
                "payment.destination",
                "destination must differ from the source account",
            ));
        }

        let amount = Drops(self.payment.amount_drops);
        if amount.get() == 0 || amount > Drops::MAX {
            return Err(ConfigError::invalid(
                "payment.amount_drops",
                "must be between 1 and 10^17",
            ));
        }

        Ok(PaymentRoute {
            source,
            destination,
            amount,
            destination_tag: self.payment.destination_tag,
        })
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("xrpl-iot.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            account: None,
            enable_desktop_notifications: true,
            ledger: LedgerConfig::default(),
            payment: PaymentConfig::default(),
            device: DeviceConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
