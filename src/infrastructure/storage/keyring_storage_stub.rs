//! Stub secret storage for builds without keyring support.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::{AccountAddress, AccountSecret};
use crate::domain::errors::SecretError;
use crate::domain::ports::SecretStoragePort;

/// Secret storage that never holds anything.
/// Used when keyring feature is disabled.
pub struct KeyringSecretStorage;

impl KeyringSecretStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn for_account(_account: &AccountAddress) -> Self {
        Self
    }

    #[must_use]
    pub fn with_names(_service: impl Into<String>, _user: impl Into<String>) -> Self {
        Self
    }
}

impl Default for KeyringSecretStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStoragePort for KeyringSecretStorage {
    async fn get_secret(&self) -> Result<Option<AccountSecret>, SecretError> {
        debug!("Keyring feature disabled - no secret storage available");
        Ok(None)
    }

    async fn store_secret(&self, _secret: &AccountSecret) -> Result<(), SecretError> {
        debug!("Keyring feature disabled - cannot store secret");
        Err(SecretError::NotAvailable)
    }

    async fn delete_secret(&self) -> Result<(), SecretError> {
        debug!("Keyring feature disabled - nothing to delete");
        Ok(())
    }
}
