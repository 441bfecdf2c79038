//! `sigil issue` — Issue a credential through a running node.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Owner user identifier.
    #[arg(short, long)]
    pub user: String,

    /// Issuer display name.
    #[arg(short, long)]
    pub issuer: String,

    /// Credential title.
    #[arg(short, long)]
    pub title: String,

    /// Credential type (certification, degree, badge, license, other).
    #[arg(short = 'k', long = "type", default_value = "certification")]
    pub kind: String,

    /// Issue date (YYYY-MM-DD).
    #[arg(long)]
    pub issue_date: String,

    /// Expiry date (YYYY-MM-DD).
    #[arg(long)]
    pub expiry_date: Option<String>,

    /// Skill identifiers, comma-separated.
    #[arg(short, long, value_delimiter = ',')]
    pub skills: Vec<String>,

    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueRequest {
    user_id: String,
    issuer: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    issue_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_date: Option<String>,
    skills: Vec<String>,
}

#[derive(Deserialize)]
struct IssueResponse {
    credential: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials", args.node);
    let body = IssueRequest {
        user_id: args.user.clone(),
        issuer: args.issuer.clone(),
        title: args.title.clone(),
        kind: args.kind.clone(),
        issue_date: args.issue_date.clone(),
        expiry_date: args.expiry_date.clone(),
        skills: args.skills.clone(),
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: IssueResponse = r.json().await?;
            let credential = &data.credential;
            println!("Credential created!");
            println!("  ID:       {}", credential["id"].as_str().unwrap_or("?"));
            println!("  Title:    {}", credential["title"].as_str().unwrap_or("?"));
            println!("  Status:   {}", credential["anchorStatus"].as_str().unwrap_or("?"));
            if let Some(digest) = credential["digest"].as_str() {
                println!("  Digest:   {}", digest);
            }
            println!();
            println!("Anchoring runs in the background; check with: sigil get");
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("creation failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("creation failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
