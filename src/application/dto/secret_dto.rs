//! Account secret DTOs.

use crate::domain::entities::Credentials;

/// Source of the account secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Secret from `--secret` or `XRPL_IOT_SECRET`.
    CommandLine,
    /// Secret from system keyring.
    Keyring,
    /// Secret entered on the secret screen.
    UserInput,
}

impl SecretSource {
    /// Returns human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CommandLine => "command line / environment",
            Self::Keyring => "system keyring",
            Self::UserInput => "user input",
        }
    }
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Request to adopt a secret.
#[derive(Clone)]
pub struct SecretRequest {
    /// Base58 seed text.
    pub secret: zeroize::Zeroizing<String>,
    /// Where the text came from.
    pub source: SecretSource,
    /// Whether to persist the secret in the keyring.
    pub persist: bool,
}

impl SecretRequest {
    /// Creates new request that persists the secret.
    #[must_use]
    pub fn new(secret: impl Into<String>, source: SecretSource) -> Self {
        Self {
            secret: zeroize::Zeroizing::new(secret.into()),
            source,
            persist: true,
        }
    }

    /// Disables secret persistence.
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }
}

impl std::fmt::Debug for SecretRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRequest")
            .field("source", &self.source)
            .field("persist", &self.persist)
            .finish_non_exhaustive()
    }
}

/// Credentials ready for signing, with their origin.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// Address and secret.
    pub credentials: Credentials,
    /// Source of the secret.
    pub source: SecretSource,
    /// Whether the secret is now stored in the keyring.
    pub persisted: bool,
}

impl ResolvedCredentials {
    /// Creates new resolved credentials.
    #[must_use]
    pub const fn new(credentials: Credentials, source: SecretSource, persisted: bool) -> Self {
        Self {
            credentials,
            source,
            persisted,
        }
    }
}
