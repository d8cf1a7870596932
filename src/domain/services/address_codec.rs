//! Base58Check codec for ledger account addresses and seeds.
//!
//! Ledger identifiers use the ripple base58 alphabet and a four byte
//! double-SHA-256 checksum. Each identifier kind carries its own version
//! prefix, which is why addresses start with `r` and seeds with `s`.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::domain::errors::CodecError;

/// Version prefix of classic account addresses.
pub const ACCOUNT_ID_PREFIX: &[u8] = &[0x00];
/// Version prefix of secp256k1 family seeds.
pub const FAMILY_SEED_PREFIX: &[u8] = &[0x21];
/// Version prefix of ed25519 seeds.
pub const ED25519_SEED_PREFIX: &[u8] = &[0x01, 0xE1, 0x4B];

/// Account identifier length in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;
/// Seed entropy length in bytes.
pub const SEED_LEN: usize = 16;

/// Encodes `prefix || payload || checksum` with the ripple alphabet.
#[must_use]
pub fn encode_check(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);

    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// Decodes base58 text and verifies the trailing checksum.
///
/// Returns the versioned payload without the checksum.
///
/// # Errors
/// Returns error if the text is not base58 or the checksum does not match.
pub fn decode_check(encoded: &str) -> Result<Vec<u8>, CodecError> {
    bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } | bs58::decode::Error::NoChecksum => {
                CodecError::Checksum
            }
            other => CodecError::Base58(other.to_string()),
        })
}

/// Decodes text expected to carry `prefix` followed by `len` payload bytes.
///
/// # Errors
/// Returns error on invalid text, bad checksum, or a prefix/length mismatch.
pub fn decode_with_prefix(encoded: &str, prefix: &[u8], len: usize) -> Result<Vec<u8>, CodecError> {
    let data = decode_check(encoded)?;

    if data.len() != prefix.len() + len || !data.starts_with(prefix) {
        return Err(CodecError::Payload { expected: len });
    }

    Ok(data[prefix.len()..].to_vec())
}

/// Encodes a 20 byte account identifier as a classic address.
#[must_use]
pub fn encode_account_id(account_id: &[u8; ACCOUNT_ID_LEN]) -> String {
    encode_check(ACCOUNT_ID_PREFIX, account_id)
}

/// Decodes a classic address into its account identifier.
///
/// # Errors
/// Returns error if the address is malformed.
pub fn decode_account_id(address: &str) -> Result<[u8; ACCOUNT_ID_LEN], CodecError> {
    let payload = decode_with_prefix(address, ACCOUNT_ID_PREFIX, ACCOUNT_ID_LEN)?;
    let mut out = [0u8; ACCOUNT_ID_LEN];
    out.copy_from_slice(&payload);
    Ok(out)
}

/// Derives the account identifier of a public key: RIPEMD-160(SHA-256(key)).
#[must_use]
pub fn account_id_from_public_key(public_key: &[u8]) -> [u8; ACCOUNT_ID_LEN] {
    let digest = Ripemd160::digest(Sha256::digest(public_key));
    let mut out = [0u8; ACCOUNT_ID_LEN];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_account_encoding() {
        assert_eq!(
            encode_account_id(&[0u8; ACCOUNT_ID_LEN]),
            "rrrrrrrrrrrrrrrrrrrrrhoLvTp"
        );
    }

    #[test]
    fn test_account_id_round_trip() {
        let id: [u8; ACCOUNT_ID_LEN] = core::array::from_fn(|i| u8::try_from(i * 7).unwrap());
        let address = encode_account_id(&id);

        assert!(address.starts_with('r'));
        assert_eq!(decode_account_id(&address).unwrap(), id);
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut address = encode_account_id(&[9u8; ACCOUNT_ID_LEN]);
        let last = address.pop().unwrap();
        address.push(if last == 'r' { 'p' } else { 'r' });

        assert_eq!(decode_account_id(&address), Err(CodecError::Checksum));
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let seed = encode_check(FAMILY_SEED_PREFIX, &[1u8; SEED_LEN]);

        assert!(seed.starts_with('s'));
        assert_eq!(
            decode_account_id(&seed),
            Err(CodecError::Payload {
                expected: ACCOUNT_ID_LEN
            })
        );
    }

    #[test]
    fn test_non_alphabet_characters_rejected() {
        // '0' and 'l' are not part of the ripple alphabet.
        assert!(matches!(
            decode_check("r0l"),
            Err(CodecError::Base58(_))
        ));
    }

    #[test]
    fn test_truncated_text_has_no_checksum() {
        assert_eq!(decode_check("rrr"), Err(CodecError::Checksum));
    }

    #[test]
    fn test_ed25519_seed_prefix() {
        let seed = encode_check(ED25519_SEED_PREFIX, &[0u8; SEED_LEN]);
        assert!(seed.starts_with("sEd"));
    }
}
