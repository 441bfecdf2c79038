use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use sigil_core::TxRef;

/// Why a verification did not (or did) succeed.
///
/// The wire strings are a stable vocabulary consumed by downstream clients
/// and must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    CredentialNotFound,
    NotAnchored,
    Revoked,
    TransactionNotFound,
    NoMemoFound,
    HashMismatch,
    UnknownIssuer,
    RpcError,
    VerificationError,
    VerificationPending,
}

impl ReasonCode {
    /// Snake-case wire string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialNotFound => "credential_not_found",
            Self::NotAnchored => "not_anchored",
            Self::Revoked => "revoked",
            Self::TransactionNotFound => "transaction_not_found",
            Self::NoMemoFound => "no_memo_found",
            Self::HashMismatch => "hash_mismatch",
            Self::UnknownIssuer => "unknown_issuer",
            Self::RpcError => "rpc_error",
            Self::VerificationError => "verification_error",
            Self::VerificationPending => "verification_pending",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata for a recognized issuer, keyed by its ledger signer identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub trusted: bool,
}

impl IssuerRecord {
    /// A trusted record with just a display name.
    pub fn trusted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo_url: None,
            website_url: None,
            trusted: true,
        }
    }
}

/// Pointer to the on-ledger anchor backing a verified credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReference {
    pub transaction_ref: TxRef,
    pub explorer_url: String,
}

/// The outcome of a verification run. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<IssuerRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_reference: Option<ChainReference>,
    pub checked_at: DateTime<Utc>,
}

impl VerificationResult {
    /// A passing result carrying the resolved issuer and chain pointer.
    pub fn passed(issuer: IssuerRecord, chain_reference: ChainReference) -> Self {
        Self {
            verified: true,
            reason_code: None,
            issuer: Some(issuer),
            chain_reference: Some(chain_reference),
            checked_at: Utc::now(),
        }
    }

    /// A failing result with its reason code.
    pub fn failed(reason: ReasonCode) -> Self {
        Self {
            verified: false,
            reason_code: Some(reason),
            issuer: None,
            chain_reference: None,
            checked_at: Utc::now(),
        }
    }
}
