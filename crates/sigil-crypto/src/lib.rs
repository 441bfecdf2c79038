//! Sigil Crypto — Ed25519 key pairs, signer identities, and signatures.

pub mod error;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use keys::{Keypair, SignerId};
pub use signing::{sign, verify, Signature};
