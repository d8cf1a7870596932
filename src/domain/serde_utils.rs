//! Serde helpers for ledger JSON.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Drop amounts, which the ledger writes as decimal strings.
pub mod drops {
    use super::{Deserializer, Serializer, Visitor, de, fmt};

    /// Serializes a u64 as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserializes a u64 from a decimal string or number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither, or negative.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrIntVisitor;

        impl Visitor<'_> for StringOrIntVisitor {
            type Value = u64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer amount of drops")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value).map_err(de::Error::custom)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse::<u64>().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(StringOrIntVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Fee {
        #[serde(with = "super::drops")]
        base: u64,
    }

    #[test]
    fn test_string_and_number_drops() {
        let fee: Fee = serde_json::from_str(r#"{"base":"10"}"#).unwrap();
        assert_eq!(fee.base, 10);
        let fee: Fee = serde_json::from_str(r#"{"base":12}"#).unwrap();
        assert_eq!(fee.base, 12);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Fee { base: 5000 }).unwrap();
        assert_eq!(json, r#"{"base":"5000"}"#);
    }

    #[test]
    fn test_negative_drops_rejected() {
        assert!(serde_json::from_str::<Fee>(r#"{"base":-1}"#).is_err());
        assert!(serde_json::from_str::<Fee>(r#"{"base":"-1"}"#).is_err());
    }
}
