//! `sigil revoke` — Revoke an anchored credential (admin).

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Credential identifier.
    pub id: String,

    /// Admin bearer token, if the node requires one.
    #[arg(long)]
    pub token: Option<String>,

    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
struct RevokeResponse {
    credential: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &RevokeArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}/revoke", args.node, args.id);
    let client = reqwest::Client::new();
    let mut req = client.post(&url);
    if let Some(token) = &args.token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: RevokeResponse = r.json().await?;
            println!("Credential revoked.");
            println!(
                "  ID:     {}",
                data.credential["id"].as_str().unwrap_or("?")
            );
            println!(
                "  Status: {}",
                data.credential["anchorStatus"].as_str().unwrap_or("?")
            );
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("revocation failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("revocation failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
