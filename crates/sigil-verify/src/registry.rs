//! The issuer trust store: ledger signer identity → recognized issuer.
//!
//! Pure lookup, no network calls. Registration is an administrative action
//! and is never reachable from the verification read path.

use dashmap::DashMap;

use sigil_crypto::SignerId;

use crate::types::IssuerRecord;

/// Trust store mapping ledger signer identities to issuer metadata.
pub trait IssuerRegistry: Send + Sync {
    /// Look up the record for a signer identity.
    fn lookup(&self, signer: &SignerId) -> Option<IssuerRecord>;

    /// Register or update an issuer. Administrative only.
    fn register(&self, signer: SignerId, record: IssuerRecord);

    /// All registered issuers.
    fn list(&self) -> Vec<(SignerId, IssuerRecord)>;

    /// Whether a signer is present and marked trusted.
    fn is_trusted(&self, signer: &SignerId) -> bool {
        self.lookup(signer).map(|r| r.trusted).unwrap_or(false)
    }
}

/// In-memory [`IssuerRegistry`] backed by a `DashMap`.
#[derive(Default)]
pub struct InMemoryIssuerRegistry {
    issuers: DashMap<SignerId, IssuerRecord>,
}

impl InMemoryIssuerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `register`, for preloading from configuration.
    pub fn with_issuer(self, signer: SignerId, record: IssuerRecord) -> Self {
        self.issuers.insert(signer, record);
        self
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

impl IssuerRegistry for InMemoryIssuerRegistry {
    fn lookup(&self, signer: &SignerId) -> Option<IssuerRecord> {
        self.issuers.get(signer).map(|r| r.clone())
    }

    fn register(&self, signer: SignerId, record: IssuerRecord) {
        tracing::info!(signer = %signer, name = %record.name, trusted = record.trusted, "issuer registered");
        self.issuers.insert(signer, record);
    }

    fn list(&self) -> Vec<(SignerId, IssuerRecord)> {
        self.issuers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
