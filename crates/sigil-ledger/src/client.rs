use async_trait::async_trait;
use std::time::Duration;

use sigil_core::TxRef;
use sigil_crypto::SignerId;

use crate::error::LedgerError;
use crate::types::{Lamports, LedgerTransaction, SequencingToken, SignedTransaction};

/// Ledger client interface.
///
/// The anchoring and verification layers program against this boundary;
/// implementations bridge to a concrete backend (JSON-RPC endpoint, mock).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Query the balance of a signer's account.
    async fn balance(&self, signer: &SignerId) -> Result<Lamports, LedgerError>;

    /// Fetch a fresh sequencing token. Tokens are time sensitive and must be
    /// obtained immediately before signing, never cached across attempts.
    async fn latest_sequencing_token(&self) -> Result<SequencingToken, LedgerError>;

    /// Submit a signed transaction, returning its reference.
    async fn submit(&self, tx: &SignedTransaction) -> Result<TxRef, LedgerError>;

    /// Wait until a submitted transaction is confirmed, up to `timeout`.
    async fn await_confirmation(&self, tx_ref: &TxRef, timeout: Duration)
        -> Result<(), LedgerError>;

    /// Read a transaction back from the ledger. `Ok(None)` means the ledger
    /// answered and the transaction does not exist; `Err` means the ledger
    /// could not be asked.
    async fn fetch_transaction(
        &self,
        tx_ref: &TxRef,
    ) -> Result<Option<LedgerTransaction>, LedgerError>;
}
