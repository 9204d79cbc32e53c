use serde::{Deserialize, Serialize};

use crate::id::TransactionId;
use crate::wallet::Wallet;

/// A single name/value metadata pair attached to a transaction
///
/// Tag order is significant: consumers of a published manifest read tags
/// positionally as well as by name, so `Vec<Tag>` preserves builder order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A signed unit of storage on the content-addressed ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Derived from the signature under normal flow; see [`Transaction::bind_id`]
    /// for the one place it is overridden
    pub id: TransactionId,

    /// The payload carried by this transaction
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,

    /// Ordered metadata pairs
    pub tags: Vec<Tag>,

    /// Detached signature over data and tags; empty until signed
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Create an unsigned transaction over `data` with the given tags
    pub fn new(data: Vec<u8>, tags: Vec<Tag>) -> Self {
        Self {
            id: TransactionId::default(),
            data,
            tags,
            signature: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.push(Tag::new(name, value));
    }

    /// Sign the transaction and derive its id from the signature
    pub fn sign(&mut self, wallet: &Wallet) {
        self.signature = wallet.sign(&self.signing_payload());
        self.id = TransactionId::from_signature(&self.signature);
    }

    /// Overwrite this transaction's id with an externally-issued one
    ///
    /// This is the deliberate identity-aliasing step of contract
    /// registration: the registration transaction is forced to carry the
    /// bundled transaction's id so downstream indexers treat both as the
    /// same object. It is not a repair of a mis-derived id.
    pub fn bind_id(&mut self, id: TransactionId) {
        self.id = id;
    }

    /// Deterministic byte string covered by the signature: every field is
    /// length-prefixed so no two distinct transactions share a payload
    fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.data.len() + 64);
        payload.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        payload.extend_from_slice(&self.data);
        payload.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        for tag in &self.tags {
            payload.extend_from_slice(&(tag.name.len() as u64).to_le_bytes());
            payload.extend_from_slice(tag.name.as_bytes());
            payload.extend_from_slice(&(tag.value.len() as u64).to_le_bytes());
            payload.extend_from_slice(tag.value.as_bytes());
        }
        payload
    }
}

/// Byte fields travel as unpadded base64url strings on the wire
mod base64_bytes {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        URL_SAFE_NO_PAD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
