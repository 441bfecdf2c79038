//! The chain-backed verification engine.
//!
//! Checks run in order from cheapest to most expensive and short-circuit on
//! the first failure. Every "not verified" outcome is a reason code on the
//! result; only store failures propagate as errors. Ledger reads follow one
//! retry policy: a single retry after a fixed delay on retryable errors.

use std::sync::Arc;
use std::time::Duration;

use sigil_core::{memo, AnchorStatus, Credential, TxRef};
use sigil_ledger::{Cluster, LedgerClient, LedgerError, LedgerTransaction};

use crate::error::VerifyError;
use crate::registry::IssuerRegistry;
use crate::store::CredentialStore;
use crate::types::{ChainReference, ReasonCode, VerificationResult};

/// Delay before the single retry of a failed ledger read.
const DEFAULT_READ_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Re-derives trust in a credential from the ledger, the issuer registry,
/// and a recomputed content digest.
pub struct Verifier {
    store: Arc<dyn CredentialStore>,
    registry: Arc<dyn IssuerRegistry>,
    ledger: Arc<dyn LedgerClient>,
    cluster: Cluster,
    read_retry_delay: Duration,
}

impl Verifier {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        registry: Arc<dyn IssuerRegistry>,
        ledger: Arc<dyn LedgerClient>,
        cluster: Cluster,
    ) -> Self {
        Self {
            store,
            registry,
            ledger,
            cluster,
            read_retry_delay: DEFAULT_READ_RETRY_DELAY,
        }
    }

    pub fn with_read_retry_delay(mut self, delay: Duration) -> Self {
        self.read_retry_delay = delay;
        self
    }

    /// Verify a credential by id.
    ///
    /// Local checks (existence, revocation, anchor state) run before any
    /// network call; revocation in particular is the cheapest and most
    /// authoritative signal and never touches the ledger.
    pub async fn verify(&self, credential_id: &str) -> Result<VerificationResult, VerifyError> {
        let Some(credential) = self.store.get(credential_id)? else {
            return Ok(self.fail(credential_id, ReasonCode::CredentialNotFound));
        };

        match credential.anchor_status {
            AnchorStatus::Revoked => return Ok(self.fail(credential_id, ReasonCode::Revoked)),
            AnchorStatus::Pending => {
                return Ok(self.fail(credential_id, ReasonCode::VerificationPending))
            }
            AnchorStatus::Failed => return Ok(self.fail(credential_id, ReasonCode::NotAnchored)),
            AnchorStatus::Anchored => {}
        }
        let Some(tx_ref) = credential.transaction_ref.clone() else {
            return Ok(self.fail(credential_id, ReasonCode::NotAnchored));
        };

        let transaction = match self.fetch_transaction(&tx_ref).await {
            Ok(Some(transaction)) => transaction,
            Ok(None) => return Ok(self.fail(credential_id, ReasonCode::TransactionNotFound)),
            Err(err) if err.is_retryable() => {
                tracing::warn!(
                    credential_id = credential_id,
                    tx_ref = %tx_ref,
                    error = %err,
                    "ledger unreachable during verification"
                );
                return Ok(self.fail(credential_id, ReasonCode::RpcError));
            }
            Err(err) => {
                tracing::warn!(
                    credential_id = credential_id,
                    tx_ref = %tx_ref,
                    error = %err,
                    "unexpected ledger failure during verification"
                );
                return Ok(self.fail(credential_id, ReasonCode::VerificationError));
            }
        };

        let anchored_digest = match transaction.memo.as_deref().and_then(memo::decode) {
            Some(digest) => digest,
            None => return Ok(self.fail(credential_id, ReasonCode::NoMemoFound)),
        };

        let recomputed = match credential.compute_digest() {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(
                    credential_id = credential_id,
                    error = %err,
                    "credential no longer hashable"
                );
                return Ok(self.fail(credential_id, ReasonCode::VerificationError));
            }
        };
        if anchored_digest != recomputed {
            return Ok(self.fail(credential_id, ReasonCode::HashMismatch));
        }

        let issuer = match self.registry.lookup(&transaction.signer) {
            Some(record) if record.trusted => record,
            _ => return Ok(self.fail(credential_id, ReasonCode::UnknownIssuer)),
        };

        tracing::info!(
            credential_id = credential_id,
            tx_ref = %tx_ref,
            issuer = %issuer.name,
            "credential verified"
        );
        Ok(VerificationResult::passed(
            issuer,
            ChainReference {
                explorer_url: self.cluster.explorer_url(&tx_ref),
                transaction_ref: tx_ref,
            },
        ))
    }

    /// Strip internal fields from a credential for the public verify surface.
    pub fn public_view(credential: &Credential) -> serde_json::Value {
        let mut value = serde_json::to_value(credential).unwrap_or_default();
        if let Some(fields) = value.as_object_mut() {
            fields.remove("userId");
        }
        value
    }

    /// One ledger read, retried once after a fixed delay on retryable errors.
    async fn fetch_transaction(
        &self,
        tx_ref: &TxRef,
    ) -> Result<Option<LedgerTransaction>, LedgerError> {
        match self.ledger.fetch_transaction(tx_ref).await {
            Err(err) if err.is_retryable() => {
                tracing::debug!(tx_ref = %tx_ref, error = %err, "retrying transaction fetch");
                tokio::time::sleep(self.read_retry_delay).await;
                self.ledger.fetch_transaction(tx_ref).await
            }
            other => other,
        }
    }

    fn fail(&self, credential_id: &str, reason: ReasonCode) -> VerificationResult {
        tracing::debug!(
            credential_id = credential_id,
            reason = %reason,
            "verification failed"
        );
        VerificationResult::failed(reason)
    }
}
