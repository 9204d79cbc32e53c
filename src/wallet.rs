use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{Signer as _, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::AssetError;

/// JWK-style keyfile layout (`wallet.json`)
///
/// Only `d` (the private seed, unpadded base64url) is required to sign; the
/// public half is re-derived rather than trusted from the file.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    #[serde(default)]
    kty: Option<String>,
    #[serde(default)]
    crv: Option<String>,
    d: String,
    #[serde(default)]
    x: Option<String>,
}

/// Process-wide signing capability, loaded once at startup
///
/// The wallet is read-only after construction and shared by reference with
/// every pipeline stage that signs a transaction. Keeping it an explicit
/// value (rather than a module-level singleton) lets tests run the pipeline
/// with throwaway keys.
pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Construct a wallet from a raw 32-byte seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Load a wallet from a JWK-style JSON keyfile
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let raw = fs::read_to_string(path)?;
        let keyfile: KeyFile = serde_json::from_str(&raw)
            .map_err(|e| AssetError::Wallet(format!("malformed keyfile: {}", e)))?;
        let seed = URL_SAFE_NO_PAD
            .decode(&keyfile.d)
            .map_err(|e| AssetError::Wallet(format!("keyfile seed is not base64url: {}", e)))?;
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| AssetError::Wallet("keyfile seed must be 32 bytes".to_string()))?;
        Ok(Self::from_seed(seed))
    }

    /// Sign a message, returning the detached signature bytes
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    /// The ledger address of this wallet: the hash of its public key,
    /// rendered as unpadded base64url
    pub fn address(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_key.verifying_key().to_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        URL_SAFE_NO_PAD.encode(digest)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::io::Write;

    /// A throwaway wallet for pipeline tests
    pub fn test_wallet() -> Wallet {
        Wallet::from_seed([42; 32])
    }

    #[test]
    fn test_sign_is_deterministic() {
        let wallet = test_wallet();
        let sig1 = wallet.sign(b"payload");
        let sig2 = wallet.sign(b"payload");
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
        assert_ne!(sig1, wallet.sign(b"other payload"));
    }

    #[test]
    fn test_address_is_stable() {
        let wallet = test_wallet();
        assert_eq!(wallet.address(), wallet.address());
        assert_ne!(wallet.address(), Wallet::from_seed([7; 32]).address());
    }

    #[test]
    fn test_load_keyfile() {
        let seed = [9u8; 32];
        let keyfile = serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "d": URL_SAFE_NO_PAD.encode(seed),
        });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", keyfile).unwrap();

        let wallet = Wallet::load(file.path()).unwrap();
        assert_eq!(wallet.address(), Wallet::from_seed(seed).address());
    }

    #[test]
    fn test_load_rejects_short_seed() {
        let keyfile = serde_json::json!({ "d": URL_SAFE_NO_PAD.encode([1u8; 16]) });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", keyfile).unwrap();

        assert!(matches!(
            Wallet::load(file.path()),
            Err(AssetError::Wallet(_))
        ));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let wallet = test_wallet();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains(&wallet.address()));
        assert!(!debug.contains("signing_key"));
    }
}
