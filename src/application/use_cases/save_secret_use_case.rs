//! Secret entry use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{ResolvedCredentials, SecretRequest};
use crate::domain::entities::{AccountAddress, AccountSecret, Credentials};
use crate::domain::errors::SecretError;
use crate::domain::ports::SecretStoragePort;

/// Validates a secret entered by the user and optionally stores it.
#[derive(Clone)]
pub struct SaveSecretUseCase {
    storage_port: Arc<dyn SecretStoragePort>,
    account: Option<AccountAddress>,
}

impl SaveSecretUseCase {
    /// Creates new use case. `account` overrides the derived address.
    #[must_use]
    pub const fn new(storage_port: Arc<dyn SecretStoragePort>, account: Option<AccountAddress>) -> Self {
        Self {
            storage_port,
            account,
        }
    }

    /// Executes secret adoption with provided request.
    ///
    /// # Errors
    /// Returns error if the secret is malformed or yields no key.
    pub async fn execute(&self, request: SecretRequest) -> Result<ResolvedCredentials, SecretError> {
        debug!(source = %request.source, "Adopting account secret");

        let secret = AccountSecret::parse(&request.secret).inspect_err(|e| {
            warn!(error = %e, "Invalid secret format provided");
        })?;
        let credentials = Credentials::new(secret, self.account.clone())?;

        info!(account = %credentials.address(), "Secret accepted");

        let persisted = if request.persist {
            match self.storage_port.store_secret(credentials.secret()).await {
                Ok(()) => {
                    info!("Secret persisted to secure storage");
                    true
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist secret to secure storage");
                    false
                }
            }
        } else {
            debug!("Secret persistence disabled, skipping storage");
            false
        };

        Ok(ResolvedCredentials::new(credentials, request.source, persisted))
    }

    /// Deletes the stored secret.
    ///
    /// # Errors
    /// Returns error if deletion fails.
    pub async fn delete_secret(&self) -> Result<(), SecretError> {
        debug!("Deleting secret from secure storage");
        match self.storage_port.delete_secret().await {
            Ok(()) => {
                info!("Secret deleted from secure storage");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete secret from secure storage");
                Err(e)
            }
        }
    }
}
