/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Verification infrastructure errors.
///
/// "Not verified" outcomes are reason codes on the result, never errors;
/// only infrastructure-level failures propagate here.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
