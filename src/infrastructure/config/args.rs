use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "xrpl-iot",
    version,
    about = "Send device commands as XRP Ledger memo payments",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Ledger websocket endpoint.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Account seed used for signing.
    #[arg(long, env = "XRPL_IOT_SECRET", hide_env_values = true, value_name = "SEED")]
    pub secret: Option<String>,

    /// Source account, when it differs from the seed's master address.
    #[arg(long, value_name = "ADDRESS")]
    pub account: Option<String>,

    /// Upper bound for one dispatch in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Enable desktop notifications.
    #[arg(long)]
    pub enable_desktop_notifications: Option<bool>,

    /// Enable mouse support.
    #[arg(long)]
    pub mouse: Option<bool>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

impl CliArgs {
    /// Returns the selected mode, the control screen by default.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Ui)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Mode {
    /// Open the control screen.
    Ui,
    /// Send one command and print the transaction hash.
    Send {
        /// Command to send, such as `turn_on`.
        command: String,
    },
    /// Run device actions for commands the account sends.
    Listen,
    /// Remove the stored seed from the system keyring.
    ForgetSecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_ui() {
        let args = CliArgs::parse_from(["xrpl-iot"]);
        assert_eq!(args.mode(), Mode::Ui);
    }

    #[test]
    fn test_send_mode() {
        let args = CliArgs::parse_from(["xrpl-iot", "--log-level", "debug", "send", "turn_on"]);

        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(
            args.mode(),
            Mode::Send {
                command: "turn_on".to_string()
            }
        );
    }

    #[test]
    fn test_forget_secret_mode() {
        let args = CliArgs::parse_from(["xrpl-iot", "forget-secret"]);
        assert_eq!(args.mode(), Mode::ForgetSecret);
    }
}
