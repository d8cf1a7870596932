//! Account secret and credentials value objects.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::entities::AccountAddress;
use crate::domain::errors::SecretError;
use crate::domain::services::address_codec::{
    ED25519_SEED_PREFIX, FAMILY_SEED_PREFIX, SEED_LEN, decode_check,
};
use crate::domain::services::keypair::Keypair;

/// Signature algorithm selected by the seed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Family seed (`s...`).
    Secp256k1,
    /// Ed25519 seed (`sEd...`).
    Ed25519,
}

/// Base58 account seed with masked formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountSecret {
    encoded: Zeroizing<String>,
    entropy: Zeroizing<[u8; SEED_LEN]>,
    key_type: KeyType,
}

impl AccountSecret {
    /// Parses a base58 seed.
    ///
    /// # Errors
    /// Returns `InvalidFormat` if the text is not a checksummed seed.
    pub fn parse(value: &str) -> Result<Self, SecretError> {
        let encoded = Zeroizing::new(value.trim().to_string());
        let data = Zeroizing::new(
            decode_check(&encoded).map_err(|e| SecretError::InvalidFormat(e.to_string()))?,
        );

        let (key_type, payload) = if data.len() == ED25519_SEED_PREFIX.len() + SEED_LEN
            && data.starts_with(ED25519_SEED_PREFIX)
        {
            (KeyType::Ed25519, &data[ED25519_SEED_PREFIX.len()..])
        } else if data.len() == FAMILY_SEED_PREFIX.len() + SEED_LEN
            && data.starts_with(FAMILY_SEED_PREFIX)
        {
            (KeyType::Secp256k1, &data[FAMILY_SEED_PREFIX.len()..])
        } else {
            return Err(SecretError::InvalidFormat(
                "not an account seed".to_string(),
            ));
        };

        let mut entropy = Zeroizing::new([0u8; SEED_LEN]);
        entropy.copy_from_slice(payload);

        Ok(Self {
            encoded,
            entropy,
            key_type,
        })
    }

    /// Returns the seed text. Callers must not log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.encoded
    }

    /// Returns the 16 byte seed entropy.
    #[must_use]
    pub fn entropy(&self) -> &[u8] {
        self.entropy.as_slice()
    }

    /// Returns the signature algorithm.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Returns masked seed for display.
    #[must_use]
    pub fn masked(&self) -> String {
        let prefix: String = self.encoded.chars().take(2).collect();
        format!("{prefix}{}", "*".repeat(8))
    }
}

impl fmt::Debug for AccountSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSecret")
            .field("value", &self.masked())
            .field("key_type", &self.key_type)
            .finish()
    }
}

impl fmt::Display for AccountSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Account address and the secret that signs for it.
#[derive(Debug, Clone)]
pub struct Credentials {
    address: AccountAddress,
    secret: AccountSecret,
}

impl Credentials {
    /// Creates credentials, deriving the address from the secret when none
    /// is configured.
    ///
    /// A configured address that differs from the derived one is kept, since
    /// the secret may be a regular key of that account.
    ///
    /// # Errors
    /// Returns error if no key can be derived from the secret.
    pub fn new(
        secret: AccountSecret,
        address: Option<AccountAddress>,
    ) -> Result<Self, SecretError> {
        let derived = Keypair::from_secret(&secret)?.address();

        let address = match address {
            Some(configured) if configured != derived => {
                tracing::warn!(
                    configured = %configured,
                    derived = %derived,
                    "Configured account differs from secret's master address"
                );
                configured
            }
            Some(configured) => configured,
            None => derived,
        };

        Ok(Self { address, secret })
    }

    /// Returns the source account.
    #[must_use]
    pub const fn address(&self) -> &AccountAddress {
        &self.address
    }

    /// Returns the signing secret.
    #[must_use]
    pub const fn secret(&self) -> &AccountSecret {
        &self.secret
    }

    /// Derives the signing key pair.
    ///
    /// # Errors
    /// Returns error if key derivation fails.
    pub fn keypair(&self) -> Result<Keypair, SecretError> {
        Keypair::from_secret(&self.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::address_codec::encode_check;

    const GENESIS_SECRET: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const GENESIS_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn test_parse_family_seed() {
        let secret = AccountSecret::parse(GENESIS_SECRET).unwrap();
        assert_eq!(secret.key_type(), KeyType::Secp256k1);
        assert_eq!(secret.entropy().len(), SEED_LEN);
    }

    #[test]
    fn test_parse_ed25519_seed() {
        let seed = encode_check(ED25519_SEED_PREFIX, &[3u8; SEED_LEN]);
        let secret = AccountSecret::parse(&seed).unwrap();
        assert_eq!(secret.key_type(), KeyType::Ed25519);
        assert_eq!(secret.entropy(), &[3u8; SEED_LEN]);
    }

    #[test]
    fn test_address_is_not_a_seed() {
        assert!(matches!(
            AccountSecret::parse(GENESIS_ADDRESS),
            Err(SecretError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let secret = AccountSecret::parse(GENESIS_SECRET).unwrap();
        let output = format!("{secret:?} {secret}");
        assert!(!output.contains(GENESIS_SECRET));
        assert!(output.contains("sn********"));
    }

    #[test]
    fn test_credentials_derive_address() {
        let secret = AccountSecret::parse(GENESIS_SECRET).unwrap();
        let credentials = Credentials::new(secret, None).unwrap();
        assert_eq!(credentials.address().as_str(), GENESIS_ADDRESS);
    }

    #[test]
    fn test_credentials_keep_configured_address() {
        let secret = AccountSecret::parse(GENESIS_SECRET).unwrap();
        let configured = AccountAddress::from_account_id([5u8; 20]);
        let credentials = Credentials::new(secret, Some(configured.clone())).unwrap();
        assert_eq!(credentials.address(), &configured);
    }
}
