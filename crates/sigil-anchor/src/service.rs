//! The anchoring attempt loop.
//!
//! Each attempt re-checks the wallet balance and fetches a fresh sequencing
//! token; neither is ever assumed stable across attempts. Failures are
//! classified by the ledger client's typed error kinds: fatal kinds abort
//! immediately, retryable kinds back off exponentially up to the retry budget.

use std::sync::Arc;
use std::time::Duration;

use sigil_core::{memo, Digest, TxRef};
use sigil_crypto::Keypair;
use sigil_ledger::{Cluster, Lamports, LedgerClient, LedgerError, SignedTransaction, TransactionRequest};

use crate::error::{AnchorError, WalletError};
use crate::wallet::WalletMonitor;

/// Tuning knobs for the anchoring attempt loop.
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    /// Balance floor checked before every attempt.
    pub min_balance: Lamports,
    /// Self-transfer amount. Nonzero so the ledger processes the transaction
    /// rather than rejecting an all-memo, zero-value one.
    pub transfer_lamports: Lamports,
    /// Retries after the first attempt; total attempts = max_retries + 1.
    pub max_retries: u32,
    pub per_attempt_timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub cluster: Cluster,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            min_balance: Lamports(10_000_000),
            transfer_lamports: Lamports(1_000),
            max_retries: 3,
            per_attempt_timeout: Duration::from_secs(30),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            cluster: Cluster::Devnet,
        }
    }
}

/// Proof of a successful anchor.
#[derive(Debug, Clone)]
pub struct AnchorReceipt {
    pub transaction_ref: TxRef,
    pub explorer_url: String,
    pub attempts: u32,
}

/// Builds, signs, and submits anchoring transactions.
///
/// Spends ledger funds; never touches persisted credentials. The caller
/// commits the resulting status transition.
pub struct AnchorService {
    ledger: Arc<dyn LedgerClient>,
    keypair: Arc<Keypair>,
    wallet: Arc<WalletMonitor>,
    config: AnchorConfig,
}

enum AttemptError {
    Wallet(WalletError),
    Ledger(LedgerError),
}

impl AnchorService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        keypair: Arc<Keypair>,
        wallet: Arc<WalletMonitor>,
        config: AnchorConfig,
    ) -> Self {
        Self {
            ledger,
            keypair,
            wallet,
            config,
        }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Anchor a credential digest on the ledger.
    ///
    /// The digest is validated before any network call; a malformed digest
    /// never spends an attempt.
    pub async fn anchor(&self, digest: &str) -> Result<AnchorReceipt, AnchorError> {
        let digest = Digest::parse(digest).map_err(|_| AnchorError::InvalidDigestFormat)?;
        let memo = memo::encode(&digest);

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(&memo).await {
                Ok(transaction_ref) => {
                    let explorer_url = self.config.cluster.explorer_url(&transaction_ref);
                    tracing::info!(
                        tx_ref = %transaction_ref,
                        attempts = attempts,
                        "credential digest anchored"
                    );
                    return Ok(AnchorReceipt {
                        transaction_ref,
                        explorer_url,
                        attempts,
                    });
                }
                Err(AttemptError::Wallet(WalletError::InsufficientFunds {
                    available,
                    required,
                })) => {
                    tracing::warn!(
                        available = %available,
                        required = %required,
                        "anchoring aborted: wallet underfunded"
                    );
                    return Err(AnchorError::InsufficientFunds {
                        available,
                        required,
                    });
                }
                Err(AttemptError::Wallet(WalletError::QueryFailed(err)))
                | Err(AttemptError::Ledger(err)) => {
                    if !err.is_retryable() {
                        tracing::warn!(error = %err, "anchoring aborted: fatal ledger error");
                        return Err(AnchorError::Fatal(err));
                    }
                    if attempts > self.config.max_retries {
                        tracing::warn!(attempts = attempts, error = %err, "anchoring exhausted");
                        return Err(AnchorError::Exhausted {
                            attempts,
                            last_error: err,
                        });
                    }
                    let delay =
                        backoff_delay(self.config.base_delay, self.config.max_delay, attempts - 1);
                    tracing::debug!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying anchor attempt"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One attempt: preflight, fresh token, sign, submit, confirm.
    async fn attempt(&self, memo: &str) -> Result<TxRef, AttemptError> {
        self.wallet
            .ensure_minimum(self.config.min_balance)
            .await
            .map_err(AttemptError::Wallet)?;

        let token = self
            .ledger
            .latest_sequencing_token()
            .await
            .map_err(AttemptError::Ledger)?;

        let payer = self.keypair.signer_id();
        let request = TransactionRequest {
            payer,
            recipient: payer,
            lamports: self.config.transfer_lamports,
            memo: memo.to_string(),
            sequencing_token: token,
        };
        let tx = SignedTransaction::sign(request, &self.keypair).map_err(AttemptError::Ledger)?;

        let tx_ref = self.ledger.submit(&tx).await.map_err(AttemptError::Ledger)?;
        self.ledger
            .await_confirmation(&tx_ref, self.config.per_attempt_timeout)
            .await
            .map_err(AttemptError::Ledger)?;
        Ok(tx_ref)
    }
}

/// min(base * 2^n, cap) for the n-th retry (0-based).
fn backoff_delay(base: Duration, cap: Duration, retry: u32) -> Duration {
    let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
    base.checked_mul(factor).map(|d| d.min(cap)).unwrap_or(cap)
}
