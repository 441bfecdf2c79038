//! `sigil get` — Fetch a credential and its anchoring state.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Credential identifier.
    pub id: String,

    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
struct GetResponse {
    credential: serde_json::Value,
    blockchain: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &GetArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}", args.node, args.id);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: GetResponse = r.json().await?;
            let c = &data.credential;
            println!("Credential:");
            println!("  ID:       {}", c["id"].as_str().unwrap_or("?"));
            println!("  User:     {}", c["userId"].as_str().unwrap_or("?"));
            println!("  Issuer:   {}", c["issuer"].as_str().unwrap_or("?"));
            println!("  Title:    {}", c["title"].as_str().unwrap_or("?"));
            println!("  Type:     {}", c["type"].as_str().unwrap_or("?"));
            println!("  Issued:   {}", c["issueDate"].as_str().unwrap_or("?"));
            if let Some(expiry) = c["expiryDate"].as_str() {
                println!("  Expires:  {}", expiry);
            }
            println!("  Status:   {}", c["anchorStatus"].as_str().unwrap_or("?"));
            if let Some(digest) = c["digest"].as_str() {
                println!("  Digest:   {}", digest);
            }

            let b = &data.blockchain;
            println!("Blockchain:");
            if let Some(tx) = b["transactionRef"].as_str() {
                println!("  Tx:       {}", tx);
                println!("  Explorer: {}", b["explorerUrl"].as_str().unwrap_or("?"));
            } else if let Some(status) = b["status"].as_str() {
                println!("  Status:   {}", status);
                if let Some(error) = b["error"].as_str() {
                    println!("  Error:    {}", error);
                }
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("lookup failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("lookup failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
