//! Ledger account address value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::CodecError;
use crate::domain::services::address_codec::{
    ACCOUNT_ID_LEN, decode_account_id, encode_account_id,
};

/// Validated classic account address (`r...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress {
    address: String,
    account_id: [u8; ACCOUNT_ID_LEN],
}

impl AccountAddress {
    /// Parses and checksums a classic address.
    ///
    /// # Errors
    /// Returns error if the text is not a valid account address.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        let address = value.trim();
        let account_id = decode_account_id(address)?;
        Ok(Self {
            address: address.to_string(),
            account_id,
        })
    }

    /// Creates address from a raw account identifier.
    #[must_use]
    pub fn from_account_id(account_id: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self {
            address: encode_account_id(&account_id),
            account_id,
        }
    }

    /// Returns address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Returns the 20 byte account identifier.
    #[must_use]
    pub const fn account_id(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.account_id
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(value: AccountAddress) -> Self {
        value.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn test_parse_valid_address() {
        let address = AccountAddress::parse(&format!(" {GENESIS} ")).unwrap();
        assert_eq!(address.as_str(), GENESIS);
        assert_eq!(
            AccountAddress::from_account_id(*address.account_id()),
            address
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(AccountAddress::parse("not-an-address").is_err());
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let address = AccountAddress::from_account_id([0u8; ACCOUNT_ID_LEN]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"rrrrrrrrrrrrrrrrrrrrrhoLvTp\"");

        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
        assert!(serde_json::from_str::<AccountAddress>("\"rBad\"").is_err());
    }
}
