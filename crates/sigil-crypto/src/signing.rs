use ed25519_dalek::Signer;
use ed25519_dalek::Verifier;

use crate::error::CryptoError;
use crate::keys::{Keypair, SignerId};

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    /// Get the raw bytes (64 bytes).
    pub fn to_bytes(&self) -> [u8; 64] {
        self.inner.to_bytes()
    }

    /// Create from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self {
            inner: ed25519_dalek::Signature::from_bytes(&arr),
        })
    }

    /// Encode as base58, the form carried on transactions.
    pub fn to_bs58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Decode from base58.
    pub fn from_bs58(s: &str) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// Sign a message using Ed25519.
pub fn sign(message: &[u8], keypair: &Keypair) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature { inner: sig }
}

/// Verify an Ed25519 signature against a signer identity.
pub fn verify(message: &[u8], signature: &Signature, signer: &SignerId) -> Result<(), CryptoError> {
    signer
        .verifying_key()?
        .verify(message, &signature.inner)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let kp = Keypair::generate();
        let message = b"anchor credential c1";
        let sig = sign(message, &kp);
        assert!(verify(message, &sig, &kp.signer_id()).is_ok());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Keypair::generate();
        let sig = sign(b"correct message", &kp);
        assert!(verify(b"wrong message", &sig, &kp.signer_id()).is_err());
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let sig = sign(b"test message", &kp1);
        assert!(verify(b"test message", &sig, &kp2.signer_id()).is_err());
    }

    #[test]
    fn test_sign_empty_message() {
        let kp = Keypair::generate();
        let sig = sign(b"", &kp);
        assert!(verify(b"", &sig, &kp.signer_id()).is_ok());
    }

    #[test]
    fn test_signature_bytes_roundtrip() {
        let kp = Keypair::generate();
        let sig = sign(b"test", &kp);
        let sig2 = Signature::from_bytes(&sig.to_bytes()).unwrap();
        assert_eq!(sig, sig2);
    }

    #[test]
    fn test_signature_bs58_roundtrip() {
        let kp = Keypair::generate();
        let sig = sign(b"test", &kp);
        let sig2 = Signature::from_bs58(&sig.to_bs58()).unwrap();
        assert_eq!(sig, sig2);
    }

    #[test]
    fn test_signature_from_invalid_bytes() {
        assert!(Signature::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_deterministic_signatures() {
        // Ed25519 signatures are deterministic for the same key + message
        let kp = Keypair::from_seed(&[99u8; 32]);
        let sig1 = sign(b"deterministic test", &kp);
        let sig2 = sign(b"deterministic test", &kp);
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_verify_arbitrary_signer_bytes_fails() {
        // Any 32 bytes parse as an address; verification against a signer
        // unrelated to the signature must fail, whether or not the bytes
        // decode to a curve point.
        let signer = SignerId::from_bytes([0u8; 32]);
        let kp = Keypair::generate();
        let sig = sign(b"msg", &kp);
        assert!(verify(b"msg", &sig, &signer).is_err());
    }
}
