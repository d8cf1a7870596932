//! Secret storage port definition.

use async_trait::async_trait;

use crate::domain::entities::AccountSecret;
use crate::domain::errors::SecretError;

/// Port for account secret persistence.
#[async_trait]
pub trait SecretStoragePort: Send + Sync {
    /// Retrieves stored secret.
    async fn get_secret(&self) -> Result<Option<AccountSecret>, SecretError>;

    /// Stores secret securely.
    async fn store_secret(&self, secret: &AccountSecret) -> Result<(), SecretError>;

    /// Deletes stored secret.
    async fn delete_secret(&self) -> Result<(), SecretError>;

    /// Checks if a secret exists.
    async fn has_secret(&self) -> Result<bool, SecretError> {
        Ok(self.get_secret().await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory secret storage.
    pub struct MockSecretStorage {
        secret: Arc<RwLock<Option<AccountSecret>>>,
    }

    impl MockSecretStorage {
        pub fn new() -> Self {
            Self {
                secret: Arc::new(RwLock::new(None)),
            }
        }

        pub fn with_secret(secret: AccountSecret) -> Self {
            Self {
                secret: Arc::new(RwLock::new(Some(secret))),
            }
        }
    }

    impl Default for MockSecretStorage {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SecretStoragePort for MockSecretStorage {
        async fn get_secret(&self) -> Result<Option<AccountSecret>, SecretError> {
            Ok(self.secret.read().await.clone())
        }

        async fn store_secret(&self, secret: &AccountSecret) -> Result<(), SecretError> {
            *self.secret.write().await = Some(secret.clone());
            Ok(())
        }

        async fn delete_secret(&self) -> Result<(), SecretError> {
            *self.secret.write().await = None;
            Ok(())
        }
    }
}
