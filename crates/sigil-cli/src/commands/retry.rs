//! `sigil retry` — Retry anchoring a failed credential (admin).

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct RetryArgs {
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
struct RetryResponse {
    credential: serde_json::Value,
    blockchain: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &RetryArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/v1/credentials/{}/retry-anchor",
        args.node, args.id
    );
    let client = reqwest::Client::new();
    let mut req = client.post(&url);
    if let Some(token) = &args.token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: RetryResponse = r.json().await?;
            let status = data.credential["anchorStatus"].as_str().unwrap_or("?");
            println!("Retry finished, status: {}", status);
            if let Some(tx) = data.blockchain["transactionRef"].as_str() {
                println!("  Tx:       {}", tx);
                println!(
                    "  Explorer: {}",
                    data.blockchain["explorerUrl"].as_str().unwrap_or("?")
                );
            } else if let Some(error) = data.blockchain["error"].as_str() {
                println!("  Error:    {}", error);
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("retry failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("retry failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
