//! Node orchestration: service wiring and the background anchor worker.
//!
//! Credential creation persists `pending` and enqueues a job; the worker
//! anchors sequentially (one spender for the shared wallet) and commits the
//! resulting status transition. The user-facing response never waits for
//! ledger confirmation.

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use sigil_anchor::{AnchorService, WalletMonitor};
use sigil_core::{AnchorEvent, AnchorStateMachine, CoreError, Credential, CredentialKind};
use sigil_crypto::{Keypair, SignerId};
use sigil_ledger::{Cluster, LedgerClient};
use sigil_verify::{
    CredentialStore, InMemoryCredentialStore, InMemoryIssuerRegistry, IssuerRecord,
    IssuerRegistry, StoreError, Verifier,
};

use crate::config::NodeConfig;

/// Errors from node-level credential operations.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("credential not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A queued anchoring request.
#[derive(Debug)]
pub struct AnchorJob {
    pub credential_id: String,
}

/// Fields accepted when creating a credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub user_id: String,
    pub issuer: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CredentialKind,
    /// `YYYY-MM-DD`.
    pub issue_date: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// The wired-together Sigil node.
pub struct SigilNode {
    store: Arc<dyn CredentialStore>,
    registry: Arc<dyn IssuerRegistry>,
    wallet: Arc<WalletMonitor>,
    anchor: AnchorService,
    verifier: Verifier,
    cluster: Cluster,
    signer: SignerId,
    job_tx: mpsc::Sender<AnchorJob>,
}

impl SigilNode {
    /// Wire the services from configuration. Returns the node and the job
    /// receiver to hand to [`SigilNode::run_worker`].
    pub fn new(
        config: &NodeConfig,
        keypair: Keypair,
        ledger: Arc<dyn LedgerClient>,
    ) -> (Arc<Self>, mpsc::Receiver<AnchorJob>) {
        let cluster = config.cluster();
        let signer = keypair.signer_id();

        let wallet = Arc::new(
            WalletMonitor::new(ledger.clone(), signer).with_thresholds(config.wallet_thresholds()),
        );
        let anchor = AnchorService::new(
            ledger.clone(),
            Arc::new(keypair),
            wallet.clone(),
            config.anchor_config(),
        );

        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
        let registry: Arc<dyn IssuerRegistry> = Arc::new(InMemoryIssuerRegistry::new());
        for entry in &config.issuers {
            match SignerId::parse(&entry.signer) {
                Ok(signer) => registry.register(
                    signer,
                    IssuerRecord {
                        name: entry.name.clone(),
                        logo_url: entry.logo_url.clone(),
                        website_url: entry.website_url.clone(),
                        trusted: entry.trusted,
                    },
                ),
                Err(err) => tracing::warn!(
                    signer = %entry.signer,
                    name = %entry.name,
                    error = %err,
                    "skipping issuer entry with invalid signer identity"
                ),
            }
        }

        let verifier = Verifier::new(
            store.clone(),
            registry.clone(),
            ledger,
            cluster.clone(),
        );

        let (job_tx, job_rx) = mpsc::channel(256);
        let node = Arc::new(Self {
            store,
            registry,
            wallet,
            anchor,
            verifier,
            cluster,
            signer,
            job_tx,
        });
        (node, job_rx)
    }

    /// Create a credential: compute its digest, persist it as `pending`, and
    /// enqueue the anchor job. Never waits on the ledger.
    pub async fn issue_credential(&self, new: NewCredential) -> Result<Credential, NodeError> {
        let id = uuid::Uuid::now_v7().to_string();
        let mut credential = Credential::new(
            id.clone(),
            new.user_id,
            new.issuer,
            new.title,
            new.kind,
            &new.issue_date,
            new.expiry_date.as_deref(),
            new.skills,
        )?
        .with_chain_id(self.cluster.chain_id());
        credential.digest = Some(credential.compute_digest()?);
        self.store.put(credential.clone())?;

        if self
            .job_tx
            .send(AnchorJob {
                credential_id: id.clone(),
            })
            .await
            .is_err()
        {
            // Worker gone; the credential stays pending and can be retried.
            tracing::error!(credential_id = %id, "anchor worker unavailable, job dropped");
        } else {
            tracing::info!(credential_id = %id, "credential created, anchor job enqueued");
        }
        Ok(credential)
    }

    /// Anchor a stored credential and commit the outcome.
    ///
    /// An anchoring failure is a successful call here: the credential comes
    /// back with `anchor_status = failed` and the error recorded. Only
    /// store/state-machine problems are `Err`.
    pub async fn anchor_credential(&self, credential_id: &str) -> Result<Credential, NodeError> {
        let mut credential = self
            .store
            .get(credential_id)?
            .ok_or_else(|| NodeError::NotFound(credential_id.to_string()))?;

        // Recompute from current data; hashing is idempotent.
        let digest = credential.compute_digest()?;
        credential.digest = Some(digest.clone());

        match self.anchor.anchor(digest.as_str()).await {
            Ok(receipt) => {
                credential.anchor_status = AnchorStateMachine::transition(
                    credential.anchor_status,
                    AnchorEvent::AnchorSucceeded,
                )?;
                credential.transaction_ref = Some(receipt.transaction_ref.clone());
                credential.anchor_error = None;
                tracing::info!(
                    credential_id = credential_id,
                    tx_ref = %receipt.transaction_ref,
                    attempts = receipt.attempts,
                    "credential anchored"
                );
            }
            Err(err) => {
                credential.anchor_status = AnchorStateMachine::transition(
                    credential.anchor_status,
                    AnchorEvent::AnchorExhausted,
                )?;
                credential.anchor_error = Some(err.to_string());
                tracing::warn!(
                    credential_id = credential_id,
                    error = %err,
                    "anchoring failed"
                );
            }
        }

        self.store.put(credential.clone())?;
        Ok(credential)
    }

    /// Administrative revoke: `anchored → revoked`. Keeps the historical
    /// transaction reference.
    pub fn revoke_credential(&self, credential_id: &str) -> Result<Credential, NodeError> {
        let mut credential = self
            .store
            .get(credential_id)?
            .ok_or_else(|| NodeError::NotFound(credential_id.to_string()))?;
        credential.anchor_status =
            AnchorStateMachine::transition(credential.anchor_status, AnchorEvent::Revoke)?;
        self.store.put(credential.clone())?;
        tracing::info!(credential_id = credential_id, "credential revoked");
        Ok(credential)
    }

    /// Consume anchor jobs sequentially until the channel closes.
    pub async fn run_worker(self: Arc<Self>, mut job_rx: mpsc::Receiver<AnchorJob>) {
        tracing::info!("anchor worker started");
        while let Some(job) = job_rx.recv().await {
            if let Err(err) = self.anchor_credential(&job.credential_id).await {
                tracing::error!(
                    credential_id = %job.credential_id,
                    error = %err,
                    "anchor job failed"
                );
            }
        }
        tracing::info!("anchor worker stopped");
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<dyn IssuerRegistry> {
        &self.registry
    }

    pub fn wallet(&self) -> &WalletMonitor {
        &self.wallet
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn signer(&self) -> SignerId {
        self.signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::AnchorStatus;
    use sigil_ledger::{Lamports, MockLedger};
    use std::time::Duration;

    fn test_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.anchor.base_delay_ms = 1;
        config.anchor.max_delay_ms = 4;
        config
    }

    fn funded_node(balance: Lamports) -> (Arc<SigilNode>, mpsc::Receiver<AnchorJob>, Arc<MockLedger>) {
        let keypair = Keypair::generate();
        let ledger = Arc::new(MockLedger::new().with_balance(keypair.signer_id(), balance));
        let (node, job_rx) = SigilNode::new(&test_config(), keypair, ledger.clone());
        (node, job_rx, ledger)
    }

    fn new_credential() -> NewCredential {
        NewCredential {
            user_id: "u1".into(),
            issuer: "AWS".into(),
            title: "Cert".into(),
            kind: CredentialKind::Certification,
            issue_date: "2024-01-01".into(),
            expiry_date: None,
            skills: vec!["py".into(), "aws".into()],
        }
    }

    #[tokio::test]
    async fn test_issue_persists_pending_with_digest() {
        let (node, _job_rx, ledger) = funded_node(Lamports(1_000_000_000));

        let credential = node.issue_credential(new_credential()).await.unwrap();
        assert_eq!(credential.anchor_status, AnchorStatus::Pending);
        assert!(credential.digest.is_some());
        assert!(credential.transaction_ref.is_none());
        assert_eq!(credential.chain_id, "solana-devnet");
        // Creation itself never touches the ledger.
        assert_eq!(ledger.total_calls(), 0);

        let stored = node.store().get(&credential.id).unwrap().unwrap();
        assert_eq!(stored.anchor_status, AnchorStatus::Pending);
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_date() {
        let (node, _job_rx, _ledger) = funded_node(Lamports(1_000_000_000));
        let mut new = new_credential();
        new.issue_date = "01/01/2024".into();
        assert!(matches!(
            node.issue_credential(new).await,
            Err(NodeError::Core(_))
        ));
    }

    #[tokio::test]
    async fn test_anchor_credential_success() {
        let (node, _job_rx, ledger) = funded_node(Lamports(1_000_000_000));
        ledger.preset_tx_ref("tx1");
        let credential = node.issue_credential(new_credential()).await.unwrap();

        let anchored = node.anchor_credential(&credential.id).await.unwrap();
        assert_eq!(anchored.anchor_status, AnchorStatus::Anchored);
        assert_eq!(anchored.transaction_ref.as_ref().unwrap().as_str(), "tx1");
        assert!(anchored.anchor_error.is_none());
    }

    #[tokio::test]
    async fn test_anchor_credential_failure_commits_failed() {
        // Below the 0.01 SOL preflight floor.
        let (node, _job_rx, _ledger) = funded_node(Lamports(1_000));
        let credential = node.issue_credential(new_credential()).await.unwrap();

        let failed = node.anchor_credential(&credential.id).await.unwrap();
        assert_eq!(failed.anchor_status, AnchorStatus::Failed);
        assert!(failed.transaction_ref.is_none());
        assert!(failed.anchor_error.as_ref().unwrap().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn test_retry_from_failed_succeeds() {
        let (node, _job_rx, ledger) = funded_node(Lamports(1_000));
        let credential = node.issue_credential(new_credential()).await.unwrap();
        node.anchor_credential(&credential.id).await.unwrap();

        // Wallet topped up; manual retry moves failed → anchored.
        ledger.set_balance(node.signer(), Lamports(1_000_000_000));
        let anchored = node.anchor_credential(&credential.id).await.unwrap();
        assert_eq!(anchored.anchor_status, AnchorStatus::Anchored);
        assert!(anchored.anchor_error.is_none());
    }

    #[tokio::test]
    async fn test_anchor_unknown_credential() {
        let (node, _job_rx, _ledger) = funded_node(Lamports(1_000_000_000));
        assert!(matches!(
            node.anchor_credential("missing").await,
            Err(NodeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_revoke_anchored_credential() {
        let (node, _job_rx, _ledger) = funded_node(Lamports(1_000_000_000));
        let credential = node.issue_credential(new_credential()).await.unwrap();
        node.anchor_credential(&credential.id).await.unwrap();

        let revoked = node.revoke_credential(&credential.id).unwrap();
        assert_eq!(revoked.anchor_status, AnchorStatus::Revoked);
        // The historical reference is preserved.
        assert!(revoked.transaction_ref.is_some());
    }

    #[tokio::test]
    async fn test_revoke_pending_is_invalid() {
        let (node, _job_rx, _ledger) = funded_node(Lamports(1_000_000_000));
        let credential = node.issue_credential(new_credential()).await.unwrap();
        assert!(matches!(
            node.revoke_credential(&credential.id),
            Err(NodeError::Core(CoreError::InvalidStatusTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_worker_anchors_enqueued_jobs() {
        let (node, job_rx, ledger) = funded_node(Lamports(1_000_000_000));
        ledger.preset_tx_ref("tx-worker");
        let worker = tokio::spawn(node.clone().run_worker(job_rx));

        let credential = node.issue_credential(new_credential()).await.unwrap();
        // Fire-and-observe: poll the store for the worker's commit.
        let mut anchored = None;
        for _ in 0..100 {
            let stored = node.store().get(&credential.id).unwrap().unwrap();
            if stored.anchor_status == AnchorStatus::Anchored {
                anchored = Some(stored);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let anchored = anchored.expect("worker never anchored the credential");
        assert_eq!(anchored.transaction_ref.unwrap().as_str(), "tx-worker");

        worker.abort();
    }

    #[tokio::test]
    async fn test_configured_issuers_are_preloaded() {
        let keypair = Keypair::generate();
        let trusted_signer = Keypair::generate().signer_id();
        let mut config = test_config();
        config.issuers = vec![
            crate::config::IssuerEntry {
                signer: trusted_signer.to_string(),
                name: "AWS".into(),
                logo_url: None,
                website_url: None,
                trusted: true,
            },
            crate::config::IssuerEntry {
                signer: "not-base58!!".into(),
                name: "Broken".into(),
                logo_url: None,
                website_url: None,
                trusted: true,
            },
        ];
        let ledger = Arc::new(MockLedger::new());
        let (node, _job_rx) = SigilNode::new(&config, keypair, ledger);

        assert!(node.registry().is_trusted(&trusted_signer));
        // The malformed entry is skipped, not fatal.
        assert_eq!(node.registry().list().len(), 1);
    }
}
