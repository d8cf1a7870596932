//! Account key derivation and transaction signing.

use ed25519_dalek::Signer;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use k256::elliptic_curve::PrimeField;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, ProjectivePoint, Scalar};
use sha2::{Digest, Sha512};

use crate::domain::entities::{AccountAddress, AccountSecret, KeyType};
use crate::domain::errors::SecretError;
use crate::domain::services::address_codec::{ACCOUNT_ID_LEN, account_id_from_public_key};

const ED25519_KEY_PREFIX: u8 = 0xED;

/// First half of a SHA-512 digest, the ledger's standard hash.
#[must_use]
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

enum KeySigner {
    Secp256k1(SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// Signing key pair derived from an account secret.
pub struct Keypair {
    public_key: Vec<u8>,
    signer: KeySigner,
}

impl Keypair {
    /// Derives the key pair for a secret.
    ///
    /// # Errors
    /// Returns error if no valid private key can be derived.
    pub fn from_secret(secret: &AccountSecret) -> Result<Self, SecretError> {
        match secret.key_type() {
            KeyType::Secp256k1 => Self::derive_secp256k1(secret.entropy()),
            KeyType::Ed25519 => Ok(Self::derive_ed25519(secret.entropy())),
        }
    }

    fn derive_secp256k1(entropy: &[u8]) -> Result<Self, SecretError> {
        let root = derive_scalar(entropy, None)?;
        let root_public = (ProjectivePoint::GENERATOR * root)
            .to_affine()
            .to_encoded_point(true);

        // Account keys use the intermediate generator at index 0.
        let intermediate = derive_scalar(root_public.as_bytes(), Some(0))?;
        let private = root + intermediate;

        let signing_key = SigningKey::from_bytes(&private.to_bytes())
            .map_err(|e| SecretError::InvalidFormat(format!("derived key rejected: {e}")))?;
        let public_key = (ProjectivePoint::GENERATOR * private)
            .to_affine()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();

        Ok(Self {
            public_key,
            signer: KeySigner::Secp256k1(signing_key),
        })
    }

    fn derive_ed25519(entropy: &[u8]) -> Self {
        let private = zeroize::Zeroizing::new(sha512_half(entropy));
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&private);

        let mut public_key = Vec::with_capacity(33);
        public_key.push(ED25519_KEY_PREFIX);
        public_key.extend_from_slice(signing_key.verifying_key().as_bytes());

        Self {
            public_key,
            signer: KeySigner::Ed25519(signing_key),
        }
    }

    /// Returns the 33 byte public key.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Returns the public key as uppercase hex.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(&self.public_key)
    }

    /// Returns the account identifier of the public key.
    #[must_use]
    pub fn account_id(&self) -> [u8; ACCOUNT_ID_LEN] {
        account_id_from_public_key(&self.public_key)
    }

    /// Returns the master address of the key pair.
    #[must_use]
    pub fn address(&self) -> AccountAddress {
        AccountAddress::from_account_id(self.account_id())
    }

    /// Signs the signing payload of a transaction.
    ///
    /// secp256k1 keys sign SHA-512Half of the payload and return a DER
    /// signature; ed25519 keys sign the payload itself.
    ///
    /// # Errors
    /// Returns error if the signer fails.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SecretError> {
        match &self.signer {
            KeySigner::Secp256k1(key) => {
                let signature = sign_secp256k1(key, message)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeySigner::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
        }
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

fn derive_scalar(bytes: &[u8], discriminator: Option<u32>) -> Result<Scalar, SecretError> {
    for counter in 0..=u32::MAX {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        if let Some(discriminator) = discriminator {
            hasher.update(discriminator.to_be_bytes());
        }
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        let candidate = FieldBytes::clone_from_slice(&digest[..32]);
        if let Some(scalar) = Option::<Scalar>::from(Scalar::from_repr(candidate))
            && scalar != Scalar::ZERO
        {
            return Ok(scalar);
        }
    }

    Err(SecretError::InvalidFormat(
        "seed does not yield a valid private key".to_string(),
    ))
}

fn sign_secp256k1(key: &SigningKey, message: &[u8]) -> Result<Signature, SecretError> {
    let digest = sha512_half(message);
    let signature: Signature = key
        .sign_prehash(&digest)
        .map_err(|e| SecretError::InvalidFormat(format!("signing failed: {e}")))?;

    Ok(signature.normalize_s().unwrap_or(signature))
}
