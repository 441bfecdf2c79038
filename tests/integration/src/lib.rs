//! Shared fixtures for the cross-crate integration tests in `tests/`.

use std::sync::Arc;
use std::time::Duration;

use sigil_anchor::{AnchorConfig, AnchorReceipt, AnchorService, WalletMonitor};
use sigil_core::{AnchorEvent, AnchorStateMachine, Credential, CredentialKind};
use sigil_crypto::{Keypair, SignerId};
use sigil_ledger::{Cluster, Lamports, MockLedger};
use sigil_verify::{
    CredentialStore, InMemoryCredentialStore, InMemoryIssuerRegistry, IssuerRecord,
    IssuerRegistry, Verifier,
};

/// The digest of [`sample_credential`] with id `c1`.
pub const SAMPLE_DIGEST: &str = "f6bbf36fc9b1c96f747d38f6f838b54ce26d393e92e199e073744859c84c479f";

/// The fixed credential used across the flow tests.
pub fn sample_credential(id: &str) -> Credential {
    Credential::new(
        id,
        "u1",
        "AWS",
        "Cert",
        CredentialKind::Certification,
        "2024-01-01",
        None,
        vec!["py".into(), "aws".into()],
    )
    .unwrap()
    .with_chain_id(Cluster::Devnet.chain_id())
}

/// All the pieces wired together against one `MockLedger`, the way the node
/// wires them, but with fast retry delays.
pub struct TestRig {
    pub ledger: Arc<MockLedger>,
    pub signer: SignerId,
    pub anchor: AnchorService,
    pub store: Arc<InMemoryCredentialStore>,
    pub registry: Arc<InMemoryIssuerRegistry>,
    pub verifier: Verifier,
}

impl TestRig {
    pub fn new(balance: Lamports) -> Self {
        Self::with_config(balance, fast_anchor_config())
    }

    pub fn with_config(balance: Lamports, config: AnchorConfig) -> Self {
        let keypair = Keypair::generate();
        let signer = keypair.signer_id();
        let ledger = Arc::new(MockLedger::new().with_balance(signer, balance));

        let wallet = Arc::new(WalletMonitor::new(ledger.clone(), signer));
        let anchor = AnchorService::new(ledger.clone(), Arc::new(keypair), wallet, config);

        let store = Arc::new(InMemoryCredentialStore::new());
        let registry = Arc::new(InMemoryIssuerRegistry::new());
        registry.register(signer, IssuerRecord::trusted("AWS"));

        let verifier = Verifier::new(
            store.clone(),
            registry.clone(),
            ledger.clone(),
            Cluster::Devnet,
        )
        .with_read_retry_delay(Duration::from_millis(1));

        Self {
            ledger,
            signer,
            anchor,
            store,
            registry,
            verifier,
        }
    }

    /// Anchor a credential and commit the result to the store, like the
    /// node's worker does.
    pub async fn anchor_and_store(&self, mut credential: Credential) -> AnchorReceipt {
        let digest = credential.compute_digest().unwrap();
        credential.digest = Some(digest.clone());
        let receipt = self.anchor.anchor(digest.as_str()).await.unwrap();
        credential.anchor_status =
            AnchorStateMachine::transition(credential.anchor_status, AnchorEvent::AnchorSucceeded)
                .unwrap();
        credential.transaction_ref = Some(receipt.transaction_ref.clone());
        self.store.put(credential).unwrap();
        receipt
    }
}

/// Anchor settings with millisecond backoff so retry tests run fast.
pub fn fast_anchor_config() -> AnchorConfig {
    AnchorConfig {
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        ..AnchorConfig::default()
    }
}
