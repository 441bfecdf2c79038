use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::anchor_state::AnchorStatus;
use crate::error::CoreError;
use crate::hash;
use crate::types::{Digest, TxRef};

/// Kinds of credentials the platform issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Certification,
    Degree,
    Badge,
    License,
    Other,
}

impl CredentialKind {
    /// Lowercase wire string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certification => "certification",
            Self::Degree => "degree",
            Self::Badge => "badge",
            Self::License => "license",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "certification" => Ok(Self::Certification),
            "degree" => Ok(Self::Degree),
            "badge" => Ok(Self::Badge),
            "license" => Ok(Self::License),
            "other" => Ok(Self::Other),
            _ => Err(CoreError::InvalidCredentialData(format!(
                "unknown credential type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A credential issued by the platform.
///
/// The identity fields (`id` through `skills`) are immutable and feed the
/// content digest; the anchoring fields are written only by the anchor
/// workflow and the administrative revoke action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub user_id: String,
    /// Issuer display name (e.g. "AWS"). Distinct from the ledger signer.
    pub issuer: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CredentialKind,
    pub issue_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    /// Skill identifiers, treated as a set.
    pub skills: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<Digest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<TxRef>,
    pub anchor_status: AnchorStatus,
    pub chain_id: String,
    /// Last anchoring failure, cleared on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_error: Option<String>,
}

impl Credential {
    /// Build a new credential from raw field values, parsing dates from
    /// `YYYY-MM-DD` strings. Starts unanchored with `AnchorStatus::Pending`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        issuer: impl Into<String>,
        title: impl Into<String>,
        kind: CredentialKind,
        issue_date: &str,
        expiry_date: Option<&str>,
        skills: Vec<String>,
    ) -> Result<Self, CoreError> {
        let issue_date = parse_date(issue_date)?;
        let expiry_date = expiry_date.map(parse_date).transpose()?;

        let credential = Self {
            id: id.into(),
            user_id: user_id.into(),
            issuer: issuer.into(),
            title: title.into(),
            kind,
            issue_date,
            expiry_date,
            skills,
            digest: None,
            transaction_ref: None,
            anchor_status: AnchorStatus::Pending,
            chain_id: String::new(),
            anchor_error: None,
        };
        credential.validate()?;
        Ok(credential)
    }

    /// Set the chain identifier (e.g. "solana-devnet").
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    /// Check the identity fields a digest can be computed from.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::InvalidCredentialData("empty id".into()));
        }
        if self.user_id.is_empty() {
            return Err(CoreError::InvalidCredentialData("empty userId".into()));
        }
        if self.issuer.is_empty() {
            return Err(CoreError::InvalidCredentialData("empty issuer".into()));
        }
        if self.title.is_empty() {
            return Err(CoreError::InvalidCredentialData("empty title".into()));
        }
        if self.skills.iter().any(|s| s.is_empty()) {
            return Err(CoreError::InvalidCredentialData("empty skill entry".into()));
        }
        Ok(())
    }

    /// Compute the content digest of this credential's identity fields.
    pub fn compute_digest(&self) -> Result<Digest, CoreError> {
        hash::digest(self)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s, hash::DATE_FORMAT)
        .map_err(|e| CoreError::InvalidCredentialData(format!("unparsable date {:?}: {}", s, e)))
}
