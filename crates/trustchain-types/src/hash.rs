use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::TypeError;

/// A SHA-256 digest: the ledger's unit of identity.
///
/// Evidence hashes, Merkle roots, previous-block links, and block content
/// hashes are all `Digest` values. The canonical textual form is 64
/// lowercase hex characters; parsing normalizes case before validation, so
/// uppercase input is accepted but never re-emitted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Length of the canonical textual form in hex characters.
    pub const HEX_LEN: usize = 64;

    /// Compute the SHA-256 digest of raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Wrap a pre-computed 32-byte hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The all-zero digest: the genesis `prevHash` sentinel.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` for the genesis sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, always 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string, normalizing case first.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; 32] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

// Digests cross the persisted-record boundary as hex strings, never as
// byte arrays.
impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = b"hello world";
        let d1 = Digest::from_bytes(data);
        let d2 = Digest::from_bytes(data);
        assert_eq!(d1, d2);
    }

    #[test]
    fn from_bytes_is_sha256() {
        // SHA-256 of the empty input is a well-known vector.
        let d = Digest::from_bytes(b"");
        assert_eq!(
            d.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn different_data_produces_different_digests() {
        assert_ne!(Digest::from_bytes(b"hello"), Digest::from_bytes(b"world"));
    }

    #[test]
    fn zero_is_genesis_sentinel() {
        let zero = Digest::zero();
        assert!(zero.is_zero());
        assert_eq!(zero.to_hex(), "0".repeat(64));
    }

    #[test]
    fn hex_roundtrip() {
        let d = Digest::from_bytes(b"test");
        let parsed = Digest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn uppercase_input_is_normalized() {
        let d = Digest::from_bytes(b"test");
        let upper = d.to_hex().to_uppercase();
        let parsed = Digest::from_hex(&upper).unwrap();
        assert_eq!(d, parsed);
        assert_eq!(parsed.to_hex(), d.to_hex());
    }

    #[test]
    fn wrong_length_rejected() {
        let err = Digest::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 64,
                actual: 4
            }
        );
    }

    #[test]
    fn non_hex_rejected() {
        let s = "g".repeat(64);
        assert!(matches!(
            Digest::from_hex(&s),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_lowercase_hex() {
        let d = Digest::from_bytes(b"test");
        let display = format!("{d}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, display.to_lowercase());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let d = Digest::from_bytes(b"serde test");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let parsed: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn serde_rejects_bad_digest() {
        assert!(serde_json::from_str::<Digest>("\"nope\"").is_err());
    }

    #[test]
    fn ordering_is_consistent() {
        let d1 = Digest::from_hash([0; 32]);
        let d2 = Digest::from_hash([1; 32]);
        assert!(d1 < d2);
    }
}
