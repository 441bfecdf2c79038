//! Canonical serialization and content hashing.
//!
//! Two credentials with the same identity fields must always produce the
//! same digest, regardless of field order, skill order, or which process
//! computed it. The canonical form is compact JSON with lexicographically
//! sorted keys, dates as `YYYY-MM-DD` strings, skills sorted and deduplicated,
//! and absent optional fields omitted rather than null.

use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

use crate::credential::Credential;
use crate::error::CoreError;
use crate::types::Digest;

/// Date format used in the canonical form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The canonical key/value map for a credential's identity fields.
///
/// A `BTreeMap` keeps keys in lexicographic order, so serialization order
/// never depends on construction order.
fn canonical_payload(credential: &Credential) -> BTreeMap<String, serde_json::Value> {
    let mut payload = BTreeMap::new();
    payload.insert("id".to_string(), credential.id.clone().into());
    payload.insert("userId".to_string(), credential.user_id.clone().into());
    payload.insert("issuer".to_string(), credential.issuer.clone().into());
    payload.insert("title".to_string(), credential.title.clone().into());
    payload.insert("type".to_string(), credential.kind.as_str().into());
    payload.insert(
        "issueDate".to_string(),
        credential.issue_date.format(DATE_FORMAT).to_string().into(),
    );
    if let Some(expiry) = credential.expiry_date {
        payload.insert(
            "expiryDate".to_string(),
            expiry.format(DATE_FORMAT).to_string().into(),
        );
    }
    let mut skills = credential.skills.clone();
    skills.sort();
    skills.dedup();
    payload.insert("skills".to_string(), skills.into());
    payload
}

/// Serialize a credential's identity fields to their canonical JSON form.
pub fn canonical_json(credential: &Credential) -> Result<String, CoreError> {
    credential.validate()?;
    serde_json::to_string(&canonical_payload(credential))
        .map_err(|e| CoreError::InvalidCredentialData(format!("serialization failed: {}", e)))
}

/// Compute the SHA-256 content digest over the canonical form.
pub fn digest(credential: &Credential) -> Result<Digest, CoreError> {
    let canonical = canonical_json(credential)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(Digest::from_hash_bytes(&hasher.finalize()))
}

/// Recompute a credential's digest and compare it to an expected value.
pub fn matches(credential: &Credential, expected: &Digest) -> Result<bool, CoreError> {
    Ok(&digest(credential)? == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialKind;

    fn sample() -> Credential {
        Credential::new(
            "c1",
            "u1",
            "AWS",
            "Cert",
            CredentialKind::Certification,
            "2024-01-01",
            None,
            vec!["py".into(), "aws".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_canonical_json_sorted_keys() {
        let json = canonical_json(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"c1","issueDate":"2024-01-01","issuer":"AWS","skills":["aws","py"],"title":"Cert","type":"certification","userId":"u1"}"#
        );
    }

    #[test]
    fn test_canonical_json_with_expiry() {
        let mut cred = sample();
        cred.expiry_date = Some(chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        let json = canonical_json(&cred).unwrap();
        assert_eq!(
            json,
            r#"{"expiryDate":"2027-01-01","id":"c1","issueDate":"2024-01-01","issuer":"AWS","skills":["aws","py"],"title":"Cert","type":"certification","userId":"u1"}"#
        );
    }

    #[test]
    fn test_digest_known_value() {
        let d = digest(&sample()).unwrap();
        assert_eq!(
            d.as_str(),
            "f6bbf36fc9b1c96f747d38f6f838b54ce26d393e92e199e073744859c84c479f"
        );
    }

    #[test]
    fn test_digest_known_value_with_expiry() {
        let mut cred = sample();
        cred.expiry_date = Some(chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        let d = digest(&cred).unwrap();
        assert_eq!(
            d.as_str(),
            "e428ec29b652c5262f9601b6898acb2edba2dc60326890e14f0f66b795f0e773"
        );
    }

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(digest(&sample()).unwrap(), digest(&sample()).unwrap());
    }

    #[test]
    fn test_skill_order_is_irrelevant() {
        let mut reordered = sample();
        reordered.skills = vec!["aws".into(), "py".into()];
        assert_eq!(digest(&sample()).unwrap(), digest(&reordered).unwrap());
    }

    #[test]
    fn test_duplicate_skills_are_collapsed() {
        let mut duplicated = sample();
        duplicated.skills = vec!["py".into(), "aws".into(), "py".into()];
        assert_eq!(digest(&sample()).unwrap(), digest(&duplicated).unwrap());
    }

    #[test]
    fn test_any_field_change_changes_digest() {
        let base = digest(&sample()).unwrap();

        let mut title = sample();
        title.title = "Cert II".into();
        assert_ne!(digest(&title).unwrap(), base);

        let mut issuer = sample();
        issuer.issuer = "GCP".into();
        assert_ne!(digest(&issuer).unwrap(), base);

        let mut date = sample();
        date.issue_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_ne!(digest(&date).unwrap(), base);

        let mut skills = sample();
        skills.skills.push("rust".into());
        assert_ne!(digest(&skills).unwrap(), base);
    }

    #[test]
    fn test_absent_expiry_differs_from_present() {
        let mut with_expiry = sample();
        with_expiry.expiry_date = Some(chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert_ne!(digest(&sample()).unwrap(), digest(&with_expiry).unwrap());
    }

    #[test]
    fn test_anchoring_fields_do_not_affect_digest() {
        let mut anchored = sample();
        anchored.chain_id = "solana-devnet".into();
        anchored.transaction_ref = Some(crate::types::TxRef::new("sig123"));
        anchored.anchor_status = crate::anchor_state::AnchorStatus::Anchored;
        assert_eq!(digest(&sample()).unwrap(), digest(&anchored).unwrap());
    }

    #[test]
    fn test_matches() {
        let cred = sample();
        let d = digest(&cred).unwrap();
        assert!(matches(&cred, &d).unwrap());

        let mut tampered = cred.clone();
        tampered.title = "Forged".into();
        assert!(!matches(&tampered, &d).unwrap());
    }

    #[test]
    fn test_invalid_credential_fails() {
        let mut cred = sample();
        cred.id = String::new();
        assert!(digest(&cred).is_err());
    }
}
