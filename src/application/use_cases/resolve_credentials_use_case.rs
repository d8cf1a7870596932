//! Credentials resolution use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{ResolvedCredentials, SecretSource};
use crate::domain::entities::{AccountAddress, AccountSecret, Credentials};
use crate::domain::errors::SecretError;
use crate::domain::ports::SecretStoragePort;

/// Resolves signing credentials from available sources.
pub struct ResolveCredentialsUseCase {
    storage_port: Arc<dyn SecretStoragePort>,
    account: Option<AccountAddress>,
}

impl ResolveCredentialsUseCase {
    /// Creates new use case. `account` overrides the derived address.
    #[must_use]
    pub const fn new(storage_port: Arc<dyn SecretStoragePort>, account: Option<AccountAddress>) -> Self {
        Self {
            storage_port,
            account,
        }
    }

    /// Resolves credentials from keyring or CLI/Env.
    ///
    /// Priority:
    /// 1. Keyring
    /// 2. CLI/Env (passed as argument)
    ///
    /// # Errors
    /// Returns error if a key cannot be derived from the resolved secret.
    pub async fn execute(
        &self,
        cli_secret: Option<String>,
    ) -> Result<Option<ResolvedCredentials>, SecretError> {
        debug!("Checking keyring for stored secret");
        match self.storage_port.get_secret().await {
            Ok(Some(secret)) => {
                info!("Using secret from system keyring");
                return self.resolve(secret, SecretSource::Keyring, true).map(Some);
            }
            Ok(None) => {
                debug!("No secret found in keyring");
            }
            Err(e) => {
                debug!(error = %e, "Failed to check keyring");
            }
        }

        let cli_secret = zeroize::Zeroizing::new(cli_secret.unwrap_or_default());
        if !cli_secret.trim().is_empty() {
            debug!("Checking command-line/env secret");
            match AccountSecret::parse(&cli_secret) {
                Ok(secret) => {
                    info!("Using secret from command line / environment");
                    return self
                        .resolve(secret, SecretSource::CommandLine, false)
                        .map(Some);
                }
                Err(e) => warn!(error = %e, "Command-line secret has invalid format"),
            }
        }

        debug!("No secret found in any source");
        Ok(None)
    }

    fn resolve(
        &self,
        secret: AccountSecret,
        source: SecretSource,
        persisted: bool,
    ) -> Result<ResolvedCredentials, SecretError> {
        let credentials = Credentials::new(secret, self.account.clone())?;
        info!(account = %credentials.address(), source = %source, "Credentials resolved");
        Ok(ResolvedCredentials::new(credentials, source, persisted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockSecretStorage;

    const GENESIS_SECRET: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const GENESIS_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn ed25519_secret() -> String {
        use crate::domain::services::address_codec::{ED25519_SEED_PREFIX, SEED_LEN, encode_check};
        encode_check(ED25519_SEED_PREFIX, &[1u8; SEED_LEN])
    }

    #[tokio::test]
    async fn test_keyring_priority() {
        let storage = Arc::new(MockSecretStorage::with_secret(
            AccountSecret::parse(GENESIS_SECRET).unwrap(),
        ));
        let use_case = ResolveCredentialsUseCase::new(storage, None);

        let result = use_case.execute(Some(ed25519_secret())).await.unwrap().unwrap();

        assert_eq!(result.source, SecretSource::Keyring);
        assert_eq!(result.credentials.address().as_str(), GENESIS_ADDRESS);
    }

    #[tokio::test]
    async fn test_cli_fallback() {
        let storage = Arc::new(MockSecretStorage::new());
        let use_case = ResolveCredentialsUseCase::new(storage, None);

        let result = use_case
            .execute(Some(GENESIS_SECRET.to_string()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.source, SecretSource::CommandLine);
        assert!(!result.persisted);
    }

    #[tokio::test]
    async fn test_configured_account_is_kept() {
        let storage = Arc::new(MockSecretStorage::new());
        let account = AccountAddress::from_account_id([4u8; 20]);
        let use_case = ResolveCredentialsUseCase::new(storage, Some(account.clone()));

        let result = use_case
            .execute(Some(GENESIS_SECRET.to_string()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.credentials.address(), &account);
    }

    #[tokio::test]
    async fn test_invalid_cli_secret_is_ignored() {
        let storage = Arc::new(MockSecretStorage::new());
        let use_case = ResolveCredentialsUseCase::new(storage, None);

        let result = use_case.execute(Some("not-a-seed".to_string())).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_no_secret_found() {
        let storage = Arc::new(MockSecretStorage::new());
        let use_case = ResolveCredentialsUseCase::new(storage, None);

        assert!(use_case.execute(None).await.unwrap().is_none());
    }
}
