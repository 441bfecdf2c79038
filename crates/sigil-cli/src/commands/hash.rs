//! `sigil hash` — Compute a credential's canonical form and digest locally.
//!
//! Useful for checking what digest a node would anchor, without touching a
//! node or the ledger.

use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

use sigil_core::{hash, Credential, CredentialKind};

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Path to a JSON file with the credential's identity fields
    /// (id, userId, issuer, title, type, issueDate, expiryDate?, skills).
    pub file: PathBuf,
}

/// Identity fields only; anchoring fields in the file are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashInput {
    id: String,
    user_id: String,
    issuer: String,
    title: String,
    #[serde(rename = "type")]
    kind: CredentialKind,
    issue_date: String,
    #[serde(default)]
    expiry_date: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
}

pub fn run(args: &HashArgs) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", args.file.display(), e))?;
    let input: HashInput = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid credential JSON: {}", e))?;

    let credential = Credential::new(
        input.id,
        input.user_id,
        input.issuer,
        input.title,
        input.kind,
        &input.issue_date,
        input.expiry_date.as_deref(),
        input.skills,
    )?;

    let canonical = hash::canonical_json(&credential)?;
    let digest = credential.compute_digest()?;

    println!("Canonical form:");
    println!("  {}", canonical);
    println!();
    println!("SHA-256 digest:");
    println!("  {}", digest);
    Ok(())
}
