use std::time::Duration;

use crate::types::Lamports;

/// Ledger interaction errors.
///
/// Retry decisions are driven by `is_retryable()`, never by matching on
/// message text. The retryable kinds describe transient conditions a later
/// attempt can recover from; everything else aborts the attempt loop.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("transaction not confirmed within {0:?}")]
    ConfirmationTimeout(Duration),

    #[error("sequencing token expired")]
    TokenExpired,

    /// Amounts are zero when the ledger reported the condition without them.
    #[error("insufficient funds: {available} lamports available, {required} required")]
    InsufficientFunds {
        available: Lamports,
        required: Lamports,
    },

    #[error("transaction signature invalid")]
    InvalidSignature,

    #[error("transaction rejected by ledger (code {code}): {reason}")]
    Rejected { code: i64, reason: String },

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),
}

impl LedgerError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout | Self::ConfirmationTimeout(_) | Self::TokenExpired
        )
    }
}
