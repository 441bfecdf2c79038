//! `sigil balance` — Show the node's anchoring wallet balance.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
struct WalletResponse {
    balance: u64,
    tier: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &BalanceArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/wallet", args.node);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let wallet: WalletResponse = r.json().await?;
            let sol = wallet.balance as f64 / 1_000_000_000.0;
            println!("Anchoring wallet:");
            println!("  Balance: {} lamports ({:.9} SOL)", wallet.balance, sol);
            println!("  Tier:    {}", wallet.tier);
            if wallet.tier != "healthy" {
                println!();
                println!("Top up the wallet to keep anchoring reliable.");
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("balance query failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("balance query failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
