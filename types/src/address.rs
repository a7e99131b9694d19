//! Account addresses.

use crate::error::TypeError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

type Blake2b256 = Blake2b<U32>;

/// A 20-byte account identifier, rendered as `0x`-prefixed lowercase hex.
///
/// [`Address::ZERO`] is the null account and is never a valid proposal target.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// The null account.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Takes the first 20 bytes of the Blake2b-256 digest of the label.
    pub fn derive(label: &str) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..Self::LEN]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(s.to_string()))?;
        let raw = hex::decode(digits).map_err(|_| TypeError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| TypeError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::derive("chair").is_zero());
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(Address::derive("voter1"), Address::derive("voter1"));
        assert_ne!(Address::derive("voter1"), Address::derive("voter2"));
    }

    #[test]
    fn display_parses_back() {
        let addr = Address::derive("token");
        let rendered = addr.to_string();
        assert!(rendered.starts_with("0x"));
        assert_eq!(rendered.len(), 42);
        assert_eq!(rendered.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("1234".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz00000000000000000000000000000000000000".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address_parses() {
        let parsed: Address = "0x0000000000000000000000000000000000000000".parse().unwrap();
        assert_eq!(parsed, Address::ZERO);
    }
}
