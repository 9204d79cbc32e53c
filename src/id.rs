use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::AssetError;

// TransactionId uniquely identifies a transaction on the ledger.
// It is a 32 byte long identifier, rendered as unpadded base64url text
// everywhere it crosses a wire or a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId([u8; 32]);

impl Default for TransactionId {
    fn default() -> Self {
        TransactionId([0; 32])
    }
}

impl Deref for TransactionId {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TransactionId {
    pub fn new(bytes: [u8; 32]) -> Self {
        TransactionId(bytes)
    }

    /// Derive a transaction id from a signature, the normal-flow derivation
    /// on a content-addressed ledger
    pub fn from_signature(signature: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(signature);
        TransactionId(hasher.finalize().into())
    }

    /// Whether this id still holds the all-zero placeholder value
    pub fn is_unset(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl FromStr for TransactionId {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| AssetError::InvalidId(format!("{}: {}", s, e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AssetError::InvalidId(format!("expected 32 bytes: {}", s)))?;
        Ok(TransactionId(bytes))
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Generate a unique TransactionId for testing purposes
    pub fn unique_id(seed: u8) -> TransactionId {
        TransactionId::from_signature(&[seed; 64])
    }

    #[test]
    fn test_default_id_is_unset() {
        let id = TransactionId::default();
        assert!(id.is_unset());
        assert_eq!(*id, [0u8; 32]);
    }

    #[test]
    fn test_from_signature_is_deterministic() {
        let a = TransactionId::from_signature(b"signature bytes");
        let b = TransactionId::from_signature(b"signature bytes");
        let c = TransactionId::from_signature(b"other signature");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_unset());
    }

    #[test]
    fn test_display_parse_round_trip() {
        let id = unique_id(7);
        let text = id.to_string();
        let parsed: TransactionId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("not base64url!!".parse::<TransactionId>().is_err());
        // valid base64url but wrong length
        assert!("AAAA".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_serde_uses_text_form() {
        let id = unique_id(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
