//! # Secure Secret
//!
//! Swap preimage held by whoever completes a swap. Zeroized on drop and
//! redacted in `Debug`, so it never lands in tracing output.

use super::value_objects::Hash;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte swap secret.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureSecret {
    inner: [u8; 32],
}

impl SecureSecret {
    /// Wraps raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { inner: bytes }
    }

    /// Copies from a slice. Returns None unless it is exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self::new)
    }

    /// Borrow the preimage.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.inner
    }

    /// Public form of the preimage, as published once the swap completes.
    pub fn reveal(&self) -> Hash {
        Hash::new(self.inner)
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureSecret(***)")
    }
}

impl Serialize for SecureSecret {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.inner))
    }
}

impl<'de> Deserialize<'de> for SecureSecret {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).ok_or_else(|| serde::de::Error::custom("invalid secret length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let secret = SecureSecret::new([0xAB; 32]);
        let debug_str = format!("{:?}", secret);
        assert!(!debug_str.to_lowercase().contains("ab"));
        assert!(debug_str.contains("***"));
    }

    #[test]
    fn test_from_slice_wrong_length() {
        assert!(SecureSecret::from_slice(&[0xCD; 16]).is_none());
        assert!(SecureSecret::from_slice(&[0xCD; 32]).is_some());
    }

    #[test]
    fn test_reveal_matches_bytes() {
        let secret = SecureSecret::new([7; 32]);
        assert_eq!(secret.reveal().as_bytes(), secret.as_bytes());
    }

    #[test]
    fn test_deserialize_accepts_prefixed_hex() {
        let json = format!("\"0x{}\"", "01".repeat(32));
        let secret: SecureSecret = serde_json::from_str(&json).unwrap();
        assert_eq!(secret.as_bytes(), &[1u8; 32]);
    }
}
