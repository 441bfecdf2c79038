//! Sigil Verify — issuer trust registry, credential store, and the
//! chain-backed verification engine.

pub mod error;
pub mod registry;
pub mod store;
pub mod types;
pub mod verifier;

pub use error::{StoreError, VerifyError};
pub use registry::{InMemoryIssuerRegistry, IssuerRegistry};
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use types::{ChainReference, IssuerRecord, ReasonCode, VerificationResult};
pub use verifier::Verifier;
