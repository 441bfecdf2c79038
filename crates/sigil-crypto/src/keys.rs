use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Ed25519 key pair for signing anchoring transactions.
/// Private key material is zeroized on drop.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    /// The seed is used directly as the Ed25519 private key.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw bytes.
    ///
    /// Accepts either a 32-byte seed or the 64-byte seed-plus-public-key
    /// layout used by keypair files. In the 64-byte case the trailing public
    /// key must match the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut seed = [0u8; 32];
        match bytes.len() {
            32 => seed.copy_from_slice(bytes),
            64 => {
                seed.copy_from_slice(&bytes[..32]);
                let kp = Self::from_seed(&seed);
                if kp.signing_key.verifying_key().as_bytes() != &bytes[32..] {
                    seed.zeroize();
                    return Err(CryptoError::InvalidInput(
                        "public key does not match seed".into(),
                    ));
                }
                seed.zeroize();
                return Ok(kp);
            }
            actual => {
                return Err(CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual,
                })
            }
        }
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// Get the raw private key bytes (32 bytes).
    /// Use with caution, prefer sign() where possible.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The signer identity derived from this key pair's public key.
    pub fn signer_id(&self) -> SignerId {
        SignerId::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Load a key pair from a keypair file (a JSON array of 64 bytes).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| CryptoError::InvalidInput(format!("malformed keypair file: {}", e)))?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Write this key pair to a keypair file (a JSON array of 64 bytes),
    /// creating parent directories as needed.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CryptoError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut bytes = self.to_file_bytes();
        let encoded = serde_json::to_string(&bytes)
            .map_err(|e| CryptoError::InvalidInput(format!("keypair encoding failed: {}", e)))?;
        bytes.zeroize();
        std::fs::write(path, encoded)?;
        tracing::debug!(path = %path.display(), "keypair written");
        Ok(())
    }

    /// The 64-byte file layout: seed followed by public key.
    pub fn to_file_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(&self.signing_key.to_bytes());
        out.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        out
    }

    /// Access the underlying ed25519-dalek SigningKey for signing operations.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material.
        f.debug_struct("Keypair")
            .field("signer_id", &self.signer_id())
            .finish()
    }
}

/// A signer identity on the ledger: a base58-encoded 32-byte Ed25519
/// public key. Used as wallet address, fee payer, and issuer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignerId([u8; 32]);

impl SignerId {
    /// Wrap raw public key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a base58 string into a signer identity.
    ///
    /// Validates decodability and the 32-byte length. Any 32-byte value is
    /// accepted as an address; curve membership is only checked when the
    /// identity is used to verify a signature.
    pub fn parse(s: &str) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Get the raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Access the verifying key, failing for off-curve byte strings.
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl std::str::FromStr for SignerId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SignerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SignerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
