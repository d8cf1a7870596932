//! Device driven by configured shell programs.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command as Process;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::domain::entities::Command;
use crate::domain::errors::DeviceError;
use crate::domain::ports::DevicePort;
use crate::infrastructure::config::DeviceConfig;

const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one program per command, e.g. a GPIO helper script.
#[derive(Debug, Clone)]
pub struct ShellDevice {
    actions: BTreeMap<String, Vec<String>>,
    timeout: Duration,
}

impl ShellDevice {
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            actions: config.commands.clone(),
            timeout: ACTION_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the commands with a bound action.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

#[async_trait]
impl DevicePort for ShellDevice {
    async fn execute(&self, command: &Command) -> Result<(), DeviceError> {
        let argv = self
            .actions
            .get(command.as_str())
            .ok_or_else(|| DeviceError::UnknownCommand {
                command: command.to_string(),
            })?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| DeviceError::execution_failed(command.as_str(), "empty program"))?;

        debug!(command = %command, program = %program, "Running device action");

        let child = Process::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, child)
            .await
            .map_err(|_| {
                DeviceError::execution_failed(
                    command.as_str(),
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| DeviceError::execution_failed(command.as_str(), e.to_string()))?;

        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Device action failed"
            );
            return Err(DeviceError::NonZeroExit {
                command: command.to_string(),
                code: output.status.code(),
            });
        }

        info!(
            command = %command,
            output = %String::from_utf8_lossy(&output.stdout).trim(),
            "Device action finished"
        );
        Ok(())
    }

    fn supports(&self, command: &Command) -> bool {
        self.actions.contains_key(command.as_str())
    }
}
