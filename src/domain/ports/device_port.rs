//! Device actuation port definition.

use async_trait::async_trait;

use crate::domain::entities::Command;
use crate::domain::errors::DeviceError;

/// Port for the device a received command drives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DevicePort: Send + Sync {
    /// Runs the action bound to `command`.
    async fn execute(&self, command: &Command) -> Result<(), DeviceError>;

    /// Returns whether an action is bound to `command`.
    fn supports(&self, command: &Command) -> bool;
}
