//! `sigil status` — Query the status of a running Sigil node.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: String,
    chain_id: String,
    signer: String,
    wallet: Option<Wallet>,
    credentials: usize,
    issuers: usize,
}

#[derive(Deserialize)]
struct Wallet {
    balance: u64,
    tier: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.node);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Node Status:");
            println!("  Version:     {}", status.version);
            println!("  Chain:       {}", status.chain_id);
            println!("  Signer:      {}", status.signer);
            match &status.wallet {
                Some(wallet) => println!(
                    "  Wallet:      {} lamports ({})",
                    wallet.balance, wallet.tier
                ),
                None => println!("  Wallet:      (unreachable)"),
            }
            println!("  Credentials: {}", status.credentials);
            println!("  Issuers:     {}", status.issuers);
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: sigil-node");
        }
    }

    Ok(())
}
