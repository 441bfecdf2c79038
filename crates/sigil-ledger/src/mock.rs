//! Deterministic in-memory ledger for tests and local development.
//!
//! Supports scripted per-method failures, preset transaction references, and
//! per-method call counters so tests can assert attempt counts and
//! zero-network-call paths.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use sigil_core::TxRef;
use sigil_crypto::SignerId;

use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::types::{Lamports, LedgerTransaction, SequencingToken, SignedTransaction};

/// Flat per-transaction fee charged by the mock, mirroring the ledger's
/// single-signature fee.
pub const MOCK_FEE: u64 = 5_000;

/// In-memory [`LedgerClient`] implementation.
///
/// Submissions are signature-verified, balance-checked, and must carry the
/// most recently issued sequencing token; accepted transactions become
/// fetchable records.
pub struct MockLedger {
    balances: DashMap<SignerId, u64>,
    transactions: DashMap<String, LedgerTransaction>,
    latest_token: Mutex<Option<String>>,
    preset_refs: Mutex<VecDeque<String>>,

    balance_failures: Mutex<VecDeque<LedgerError>>,
    token_failures: Mutex<VecDeque<LedgerError>>,
    submit_failures: Mutex<VecDeque<LedgerError>>,
    confirm_failures: Mutex<VecDeque<LedgerError>>,
    fetch_failures: Mutex<VecDeque<LedgerError>>,

    balance_calls: AtomicUsize,
    token_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    fetch_calls: AtomicUsize,

    token_seq: AtomicU64,
    tx_seq: AtomicU64,
    slot: AtomicU64,
}

fn pop_front<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .pop_front()
}

fn push_back<T>(queue: &Mutex<VecDeque<T>>, value: T) {
    queue
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push_back(value);
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
            transactions: DashMap::new(),
            latest_token: Mutex::new(None),
            preset_refs: Mutex::new(VecDeque::new()),
            balance_failures: Mutex::new(VecDeque::new()),
            token_failures: Mutex::new(VecDeque::new()),
            submit_failures: Mutex::new(VecDeque::new()),
            confirm_failures: Mutex::new(VecDeque::new()),
            fetch_failures: Mutex::new(VecDeque::new()),
            balance_calls: AtomicUsize::new(0),
            token_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            token_seq: AtomicU64::new(0),
            tx_seq: AtomicU64::new(0),
            slot: AtomicU64::new(0),
        }
    }

    /// Builder form of `set_balance`.
    pub fn with_balance(self, signer: SignerId, balance: Lamports) -> Self {
        self.set_balance(signer, balance);
        self
    }

    pub fn set_balance(&self, signer: SignerId, balance: Lamports) {
        self.balances.insert(signer, balance.0);
    }

    /// Queue a reference to be returned by the next accepted submission
    /// instead of a generated `mock-tx-N`.
    pub fn preset_tx_ref(&self, tx_ref: impl Into<String>) {
        push_back(&self.preset_refs, tx_ref.into());
    }

    /// Seed a transaction record directly, bypassing submission.
    pub fn insert_transaction(&self, tx: LedgerTransaction) {
        self.transactions.insert(tx.signature.as_str().to_string(), tx);
    }

    pub fn remove_transaction(&self, tx_ref: &TxRef) {
        self.transactions.remove(tx_ref.as_str());
    }

    pub fn fail_next_balance(&self, err: LedgerError) {
        push_back(&self.balance_failures, err);
    }

    pub fn fail_next_token(&self, err: LedgerError) {
        push_back(&self.token_failures, err);
    }

    pub fn fail_next_submit(&self, err: LedgerError) {
        push_back(&self.submit_failures, err);
    }

    pub fn fail_next_confirm(&self, err: LedgerError) {
        push_back(&self.confirm_failures, err);
    }

    pub fn fail_next_fetch(&self, err: LedgerError) {
        push_back(&self.fetch_failures, err);
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total calls across every ledger method.
    pub fn total_calls(&self) -> usize {
        self.balance_calls()
            + self.token_calls()
            + self.submit_calls()
            + self.confirm_calls()
            + self.fetch_calls()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn balance(&self, signer: &SignerId) -> Result<Lamports, LedgerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = pop_front(&self.balance_failures) {
            return Err(err);
        }
        Ok(Lamports(
            self.balances.get(signer).map(|v| *v).unwrap_or(0),
        ))
    }

    async fn latest_sequencing_token(&self) -> Result<SequencingToken, LedgerError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = pop_front(&self.token_failures) {
            return Err(err);
        }
        let n = self.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{}", n);
        *self
            .latest_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token.clone());
        Ok(SequencingToken::new(token))
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxRef, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = pop_front(&self.submit_failures) {
            return Err(err);
        }

        tx.verify()?;

        let latest = self
            .latest_token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if latest.as_deref() != Some(tx.request.sequencing_token.as_str()) {
            return Err(LedgerError::TokenExpired);
        }

        let request = &tx.request;
        let required = request.lamports.0 + MOCK_FEE;
        let available = self.balances.get(&request.payer).map(|v| *v).unwrap_or(0);
        if available < required {
            return Err(LedgerError::InsufficientFunds {
                available: Lamports(available),
                required: Lamports(required),
            });
        }

        self.balances
            .entry(request.payer)
            .and_modify(|b| *b -= required);
        self.balances
            .entry(request.recipient)
            .and_modify(|b| *b += request.lamports.0)
            .or_insert(request.lamports.0);

        let tx_ref = pop_front(&self.preset_refs)
            .unwrap_or_else(|| format!("mock-tx-{}", self.tx_seq.fetch_add(1, Ordering::SeqCst) + 1));
        let slot = self.slot.fetch_add(1, Ordering::SeqCst) + 1;
        let record = LedgerTransaction {
            signature: TxRef::new(tx_ref.clone()),
            signer: request.payer,
            memo: (!request.memo.is_empty()).then(|| request.memo.clone()),
            slot,
            block_time: Some(Utc::now().timestamp()),
        };
        self.transactions.insert(tx_ref.clone(), record);
        tracing::debug!(tx_ref = %tx_ref, "mock transaction recorded");
        Ok(TxRef::new(tx_ref))
    }

    async fn await_confirmation(
        &self,
        tx_ref: &TxRef,
        timeout: Duration,
    ) -> Result<(), LedgerError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = pop_front(&self.confirm_failures) {
            return Err(err);
        }
        if self.transactions.contains_key(tx_ref.as_str()) {
            Ok(())
        } else {
            Err(LedgerError::ConfirmationTimeout(timeout))
        }
    }

    async fn fetch_transaction(
        &self,
        tx_ref: &TxRef,
    ) -> Result<Option<LedgerTransaction>, LedgerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = pop_front(&self.fetch_failures) {
            return Err(err);
        }
        Ok(self.transactions.get(tx_ref.as_str()).map(|t| t.clone()))
    }
}
