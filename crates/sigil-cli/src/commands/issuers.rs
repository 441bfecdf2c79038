//! `sigil issuers` — List the node's registered issuers (admin).

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct IssuersArgs {
    /// Admin bearer token, if the node requires one.
    #[arg(long)]
    pub token: Option<String>,

    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
struct IssuersResponse {
    issuers: Vec<Issuer>,
    count: usize,
}

#[derive(Deserialize)]
struct Issuer {
    signer: String,
    name: String,
    trusted: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &IssuersArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/issuers", args.node);
    let client = reqwest::Client::new();
    let mut req = client.get(&url);
    if let Some(token) = &args.token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: IssuersResponse = r.json().await?;
            println!("Registered issuers ({}):", data.count);
            for issuer in &data.issuers {
                let marker = if issuer.trusted { "trusted" } else { "untrusted" };
                println!("  {}  {} ({})", issuer.signer, issuer.name, marker);
            }
            if data.issuers.is_empty() {
                println!("  (none)");
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("issuer listing failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("issuer listing failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
