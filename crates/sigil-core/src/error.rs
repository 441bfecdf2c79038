use crate::anchor_state::{AnchorEvent, AnchorStatus};

/// Core model errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid credential data: {0}")]
    InvalidCredentialData(String),

    #[error("invalid digest: expected 64 lowercase hex characters, got {0:?}")]
    InvalidDigest(String),

    #[error("invalid anchor status transition from {from} on {event:?}")]
    InvalidStatusTransition {
        from: AnchorStatus,
        event: AnchorEvent,
    },
}
