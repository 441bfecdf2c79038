//! Anchoring preflight and retry policy against the in-memory ledger:
//! which failures retry, which abort, and what each attempt costs.

use sigil_anchor::AnchorError;
use sigil_ledger::{Lamports, LedgerError};

use sigil_integration_tests::{fast_anchor_config, sample_credential, TestRig};

fn digest() -> String {
    sample_credential("c1")
        .compute_digest()
        .unwrap()
        .as_str()
        .to_string()
}

#[tokio::test]
async fn test_preflight_blocks_underfunded_wallet() {
    // 0.001 SOL against the 0.01 SOL floor.
    let rig = TestRig::new(Lamports(1_000_000));

    match rig.anchor.anchor(&digest()).await {
        Err(AnchorError::InsufficientFunds {
            available,
            required,
        }) => {
            assert_eq!(available, Lamports(1_000_000));
            assert_eq!(required, Lamports(10_000_000));
        }
        other => panic!("unexpected: {:?}", other),
    }

    // The gate fails before any spend-path call.
    assert_eq!(rig.ledger.balance_calls(), 1);
    assert_eq!(rig.ledger.token_calls(), 0);
    assert_eq!(rig.ledger.submit_calls(), 0);
}

#[tokio::test]
async fn test_preflight_passes_above_floor() {
    // 0.02 SOL clears the 0.01 SOL floor.
    let rig = TestRig::new(Lamports(20_000_000));
    let receipt = rig.anchor.anchor(&digest()).await.unwrap();
    assert_eq!(receipt.attempts, 1);
}

#[tokio::test]
async fn test_transient_failures_retry_until_success() {
    let rig = TestRig::new(Lamports(1_000_000_000));
    rig.ledger.fail_next_submit(LedgerError::Timeout);
    rig.ledger
        .fail_next_submit(LedgerError::Transport("connection reset".into()));

    let receipt = rig.anchor.anchor(&digest()).await.unwrap();
    assert_eq!(receipt.attempts, 3);
    // Every attempt re-runs the balance gate and takes a fresh token.
    assert_eq!(rig.ledger.balance_calls(), 3);
    assert_eq!(rig.ledger.token_calls(), 3);
    assert_eq!(rig.ledger.submit_calls(), 3);
}

#[tokio::test]
async fn test_stale_token_is_retried() {
    let rig = TestRig::new(Lamports(1_000_000_000));
    rig.ledger.fail_next_submit(LedgerError::TokenExpired);

    let receipt = rig.anchor.anchor(&digest()).await.unwrap();
    assert_eq!(receipt.attempts, 2);
}

#[tokio::test]
async fn test_fatal_rejection_aborts_without_retry() {
    let rig = TestRig::new(Lamports(1_000_000_000));
    rig.ledger
        .fail_next_submit(LedgerError::Rejected {
            code: -32002,
            reason: "account in use".into(),
        });

    match rig.anchor.anchor(&digest()).await {
        Err(AnchorError::Fatal(LedgerError::Rejected { .. })) => {}
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(rig.ledger.submit_calls(), 1);
}

#[tokio::test]
async fn test_retry_budget_exhausts() {
    let mut config = fast_anchor_config();
    config.max_retries = 2;
    let rig = TestRig::with_config(Lamports(1_000_000_000), config);
    for _ in 0..3 {
        rig.ledger
            .fail_next_submit(LedgerError::Transport("unreachable".into()));
    }

    match rig.anchor.anchor(&digest()).await {
        Err(AnchorError::Exhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.is_retryable());
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(rig.ledger.submit_calls(), 3);
}

#[tokio::test]
async fn test_malformed_digest_never_touches_the_ledger() {
    let rig = TestRig::new(Lamports(1_000_000_000));

    for bad in ["", "nothex", "F6BB", &digest()[..63]] {
        match rig.anchor.anchor(bad).await {
            Err(AnchorError::InvalidDigestFormat) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }
    assert_eq!(rig.ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_mid_run_insufficient_funds_is_fatal() {
    // Preflight passes, then the submission itself reports the shortfall.
    let rig = TestRig::new(Lamports(1_000_000_000));
    rig.ledger.fail_next_submit(LedgerError::InsufficientFunds {
        available: Lamports(100),
        required: Lamports(6_000),
    });

    match rig.anchor.anchor(&digest()).await {
        Err(AnchorError::Fatal(LedgerError::InsufficientFunds { .. })) => {}
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(rig.ledger.submit_calls(), 1);
}
