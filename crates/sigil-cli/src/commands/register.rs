//! `sigil register` — Register an issuer on the node (admin).

use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Base58 signer identity of the issuer.
    pub signer: String,

    /// Issuer display name.
    #[arg(short, long)]
    pub name: String,

    /// Logo URL.
    #[arg(long)]
    pub logo_url: Option<String>,

    /// Website URL.
    #[arg(long)]
    pub website_url: Option<String>,

    /// Register the issuer without marking it trusted.
    #[arg(long)]
    pub untrusted: bool,

    /// Admin bearer token, if the node requires one.
    #[arg(long)]
    pub token: Option<String>,

    /// Base URL of the node API.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    signer: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website_url: Option<String>,
    trusted: bool,
}

#[derive(Deserialize)]
struct RegisterResponse {
    signer: String,
    name: String,
    trusted: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &RegisterArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/issuers", args.node);
    let body = RegisterRequest {
        signer: args.signer.clone(),
        name: args.name.clone(),
        logo_url: args.logo_url.clone(),
        website_url: args.website_url.clone(),
        trusted: !args.untrusted,
    };

    let client = reqwest::Client::new();
    let mut req = client.post(&url).json(&body);
    if let Some(token) = &args.token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: RegisterResponse = r.json().await?;
            println!("Issuer registered.");
            println!("  Signer:  {}", data.signer);
            println!("  Name:    {}", data.name);
            println!("  Trusted: {}", data.trusted);
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("registration failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("registration failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
