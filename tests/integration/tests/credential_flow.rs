//! End-to-end flows across hashing, anchoring, storage, and verification,
//! all against the in-memory ledger.

use sigil_core::{memo, AnchorEvent, AnchorStateMachine, AnchorStatus};
use sigil_ledger::{Lamports, LedgerClient};
use sigil_verify::{CredentialStore, IssuerRecord, IssuerRegistry, ReasonCode};

use sigil_integration_tests::{sample_credential, TestRig, SAMPLE_DIGEST};

const FUNDED: Lamports = Lamports(1_000_000_000);

#[tokio::test]
async fn test_issue_anchor_verify_end_to_end() {
    let rig = TestRig::new(FUNDED);
    rig.ledger.preset_tx_ref("tx1");

    let credential = sample_credential("c1");
    assert_eq!(
        credential.compute_digest().unwrap().as_str(),
        SAMPLE_DIGEST
    );

    let receipt = rig.anchor_and_store(credential).await;
    assert_eq!(receipt.transaction_ref.as_str(), "tx1");
    assert_eq!(receipt.attempts, 1);

    // The on-chain record carries the prefixed digest memo.
    let record = rig
        .ledger
        .fetch_transaction(&receipt.transaction_ref)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        record.memo.as_deref(),
        Some(format!("CREDENTIAL_HASH:{}", SAMPLE_DIGEST).as_str())
    );
    assert_eq!(memo::decode(record.memo.as_deref().unwrap()).unwrap().as_str(), SAMPLE_DIGEST);

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(result.verified);
    assert!(result.reason_code.is_none());
    assert_eq!(result.issuer.as_ref().unwrap().name, "AWS");
    let chain = result.chain_reference.as_ref().unwrap();
    assert_eq!(chain.transaction_ref.as_str(), "tx1");
    assert!(chain.explorer_url.contains("tx1"));
}

#[tokio::test]
async fn test_verified_result_wire_shape() {
    let rig = TestRig::new(FUNDED);
    rig.anchor_and_store(sample_credential("c1")).await;

    let result = rig.verifier.verify("c1").await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["verified"], true);
    assert!(json.get("reasonCode").is_none());
    assert!(json["chainReference"]["explorerUrl"].is_string());
    assert!(json["checkedAt"].is_string());
}

#[tokio::test]
async fn test_tampered_credential_fails_hash_mismatch() {
    let rig = TestRig::new(FUNDED);
    rig.anchor_and_store(sample_credential("c1")).await;

    // Tamper with a stored identity field after anchoring.
    let mut stored = rig.store.get("c1").unwrap().unwrap();
    stored.title = "Forged Cert".into();
    rig.store.put(stored).unwrap();

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::HashMismatch));
}

#[tokio::test]
async fn test_skill_order_does_not_break_verification() {
    let rig = TestRig::new(FUNDED);
    rig.anchor_and_store(sample_credential("c1")).await;

    // Reordering skills leaves the canonical form, and so the digest, intact.
    let mut stored = rig.store.get("c1").unwrap().unwrap();
    stored.skills = vec!["aws".into(), "py".into()];
    rig.store.put(stored).unwrap();

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(result.verified);
}

#[tokio::test]
async fn test_revoked_short_circuits_without_ledger_calls() {
    let rig = TestRig::new(FUNDED);
    rig.anchor_and_store(sample_credential("c1")).await;

    let mut stored = rig.store.get("c1").unwrap().unwrap();
    stored.anchor_status =
        AnchorStateMachine::transition(stored.anchor_status, AnchorEvent::Revoke).unwrap();
    rig.store.put(stored).unwrap();

    let calls_before = rig.ledger.total_calls();
    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::Revoked));
    assert_eq!(rig.ledger.total_calls(), calls_before);
}

#[tokio::test]
async fn test_pending_credential_reports_verification_pending() {
    let rig = TestRig::new(FUNDED);
    let mut credential = sample_credential("c1");
    credential.digest = Some(credential.compute_digest().unwrap());
    assert_eq!(credential.anchor_status, AnchorStatus::Pending);
    rig.store.put(credential).unwrap();

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::VerificationPending));
}

#[tokio::test]
async fn test_unknown_issuer_rejected() {
    let rig = TestRig::new(FUNDED);
    // Drop the trust entry the rig registered for its own signer.
    let signer = rig.signer;
    rig.registry.register(
        signer,
        IssuerRecord {
            name: "AWS".into(),
            logo_url: None,
            website_url: None,
            trusted: false,
        },
    );
    rig.anchor_and_store(sample_credential("c1")).await;

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::UnknownIssuer));
}

#[tokio::test]
async fn test_missing_onchain_transaction() {
    let rig = TestRig::new(FUNDED);
    let receipt = rig.anchor_and_store(sample_credential("c1")).await;
    rig.ledger.remove_transaction(&receipt.transaction_ref);

    let result = rig.verifier.verify("c1").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::TransactionNotFound));
}

#[tokio::test]
async fn test_unknown_credential_id() {
    let rig = TestRig::new(FUNDED);
    let result = rig.verifier.verify("no-such-id").await.unwrap();
    assert!(!result.verified);
    assert_eq!(result.reason_code, Some(ReasonCode::CredentialNotFound));
}

#[tokio::test]
async fn test_verification_is_idempotent() {
    let rig = TestRig::new(FUNDED);
    rig.anchor_and_store(sample_credential("c1")).await;

    let first = rig.verifier.verify("c1").await.unwrap();
    let second = rig.verifier.verify("c1").await.unwrap();
    assert!(first.verified && second.verified);
    assert_eq!(
        first.chain_reference.unwrap().transaction_ref,
        second.chain_reference.unwrap().transaction_ref
    );
}
