//! Command listener use case.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::CancelToken;
use crate::domain::entities::{AccountAddress, LedgerEvent, ObservedTransaction};
use crate::domain::errors::DispatchError;
use crate::domain::ports::{DevicePort, LedgerStreamPort, NotificationPort};

/// Counters reported when the listener stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    /// Commands the device ran successfully.
    pub executed: usize,
    /// Commands the device failed to run.
    pub failed: usize,
    /// Transactions without a usable command.
    pub ignored: usize,
}

/// Runs device actions for commands the account sends to the ledger.
pub struct ListenCommandsUseCase {
    account: AccountAddress,
    device: Arc<dyn DevicePort>,
    notifier: Option<Arc<dyn NotificationPort>>,
}

impl ListenCommandsUseCase {
    /// Creates new listener for `account`.
    #[must_use]
    pub fn new(account: AccountAddress, device: Arc<dyn DevicePort>) -> Self {
        Self {
            account,
            device,
            notifier: None,
        }
    }

    /// Sends a desktop notification for every executed command.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Follows the account stream until it ends or `cancel` fires.
    ///
    /// # Errors
    /// Returns error if the stream cannot be started.
    pub async fn run(
        &self,
        stream: &mut dyn LedgerStreamPort,
        cancel: &CancelToken,
    ) -> Result<ListenSummary, DispatchError> {
        let mut events = stream.subscribe(&self.account)?;
        let mut summary = ListenSummary::default();

        info!(account = %self.account, "Listening for commands");

        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("Listener cancelled");
                    break;
                }
                event = events.recv() => event,
            };

            let Some(event) = event else {
                debug!("Ledger stream closed");
                break;
            };

            match event {
                LedgerEvent::Transaction(tx) => self.handle_transaction(&tx, &mut summary).await,
                LedgerEvent::Connected { endpoint } => {
                    info!(endpoint = %endpoint, "Ledger stream connected");
                }
                LedgerEvent::Reconnecting { attempt } => {
                    warn!(attempt, "Ledger stream reconnecting");
                }
                LedgerEvent::Disconnected { reason } => {
                    warn!(reason = %reason, "Ledger stream disconnected");
                }
                LedgerEvent::Error {
                    message,
                    recoverable,
                } => {
                    error!(message = %message, recoverable, "Ledger stream error");
                    if !recoverable {
                        break;
                    }
                }
            }
        }

        if stream.is_connected() {
            stream.disconnect();
        }
        info!(
            executed = summary.executed,
            failed = summary.failed,
            ignored = summary.ignored,
            "Listener stopped"
        );
        Ok(summary)
    }

    async fn handle_transaction(&self, tx: &ObservedTransaction, summary: &mut ListenSummary) {
        let commands = tx.commands_from(&self.account);
        if commands.is_empty() {
            debug!(
                hash = ?tx.hash,
                validated = tx.validated,
                engine_result = ?tx.engine_result,
                "Transaction carries no command for this account"
            );
            summary.ignored += 1;
            return;
        }

        for command in commands {
            if !self.device.supports(&command) {
                warn!(command = %command, "No device action for command");
                summary.ignored += 1;
                continue;
            }

            match self.device.execute(&command).await {
                Ok(()) => {
                    info!(command = %command, hash = ?tx.hash, "Command executed");
                    summary.executed += 1;
                    if let Some(notifier) = &self.notifier {
                        notifier.send("Command received", &format!("Executed '{command}'"));
                    }
                }
                Err(e) => {
                    error!(command = %command, error = %e, "Device action failed");
                    summary.failed += 1;
                }
            }
        }
    }
}
