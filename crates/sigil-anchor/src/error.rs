use sigil_ledger::{Lamports, LedgerError};

/// Wallet preflight errors.
///
/// `InsufficientFunds` is a business-rule violation and fatal for the current
/// anchoring run; `QueryFailed` is a connectivity problem whose retryability
/// follows the wrapped ledger error.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("insufficient funds: {available} lamports available, {required} required")]
    InsufficientFunds {
        available: Lamports,
        required: Lamports,
    },

    #[error("balance query failed: {0}")]
    QueryFailed(#[from] LedgerError),
}

/// Anchoring errors.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("invalid digest format: expected 64 lowercase hex characters")]
    InvalidDigestFormat,

    #[error("insufficient funds: {available} lamports available, {required} required")]
    InsufficientFunds {
        available: Lamports,
        required: Lamports,
    },

    /// A ledger error that retrying cannot fix.
    #[error("anchoring failed: {0}")]
    Fatal(LedgerError),

    #[error("anchoring exhausted after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        last_error: LedgerError,
    },
}
