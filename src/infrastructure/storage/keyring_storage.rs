//! Keyring-based secret storage.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::domain::entities::{AccountAddress, AccountSecret};
use crate::domain::errors::SecretError;
use crate::domain::ports::SecretStoragePort;

const KEYRING_SERVICE: &str = "xrpl-iot";
const KEYRING_USER: &str = "account-secret";

/// System keyring secret storage adapter.
pub struct KeyringSecretStorage {
    service: String,
    user: String,
}

impl KeyringSecretStorage {
    /// Creates new storage with default names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: KEYRING_USER.to_string(),
        }
    }

    /// Creates storage keyed by account, so several accounts can coexist.
    #[must_use]
    pub fn for_account(account: &AccountAddress) -> Self {
        Self::with_names(KEYRING_SERVICE, account.as_str())
    }

    /// Creates storage with custom names.
    #[must_use]
    pub fn with_names(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<Entry, SecretError> {
        Entry::new(&self.service, &self.user)
            .map_err(|e| SecretError::AccessFailed(format!("failed to access keyring: {e}")))
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
        debug!(service = %self.service, user = %self.user, "Retrieving secret from keyring");

        let entry = self.entry()?;

        match entry.get_password() {
            Ok(stored) => {
                debug!("Secret found in keyring");
                AccountSecret::parse(&stored).map(Some)
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No secret stored in keyring");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to retrieve secret from keyring");
                Err(SecretError::RetrievalFailed(e.to_string()))
            }
        }
    }

    async fn store_secret(&self, secret: &AccountSecret) -> Result<(), SecretError> {
        debug!(service = %self.service, user = %self.user, "Storing secret in keyring");

        let entry = self.entry()?;

        entry.set_password(secret.expose()).map_err(|e| {
            warn!(error = %e, "Failed to store secret in keyring");
            SecretError::StorageFailed(e.to_string())
        })?;

        debug!("Secret stored successfully");
        Ok(())
    }

    async fn delete_secret(&self) -> Result<(), SecretError> {
        debug!(service = %self.service, user = %self.user, "Deleting secret from keyring");

        let entry = self.entry()?;

        match entry.delete_credential() {
            Ok(()) => {
                debug!("Secret deleted from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No secret to delete");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to delete secret from keyring");
                Err(SecretError::DeletionFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires system keyring"]
    async fn test_store_and_retrieve_secret() {
        let storage = KeyringSecretStorage::with_names("xrpl-iot-test", "test-secret");
        let secret = AccountSecret::parse("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();

        storage.store_secret(&secret).await.unwrap();

        let retrieved = storage.get_secret().await.unwrap();
        assert_eq!(retrieved.unwrap().expose(), secret.expose());

        storage.delete_secret().await.unwrap();
        assert!(!storage.has_secret().await.unwrap());
    }

    #[test]
    fn test_account_scoped_names() {
        let account = AccountAddress::from_account_id([3u8; 20]);
        let storage = KeyringSecretStorage::for_account(&account);

        assert_eq!(storage.service, KEYRING_SERVICE);
        assert_eq!(storage.user, account.as_str());
    }
}
