//! `sigil verify` — Verify a credential against the ledger.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential identifier.
    pub id: String,

    /// Base URL of the node API.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub node: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    verification: Verification,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Verification {
    verified: bool,
    reason_code: Option<String>,
    issuer: Option<Issuer>,
    chain_reference: Option<ChainReference>,
    checked_at: String,
}

#[derive(Deserialize)]
struct Issuer {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainReference {
    transaction_ref: String,
    explorer_url: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/verify/{}", args.node, args.id);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: VerifyResponse = r.json().await?;
            let v = &data.verification;
            if v.verified {
                println!("VERIFIED");
                if let Some(issuer) = &v.issuer {
                    println!("  Issuer:   {}", issuer.name);
                }
                if let Some(chain) = &v.chain_reference {
                    println!("  Tx:       {}", chain.transaction_ref);
                    println!("  Explorer: {}", chain.explorer_url);
                }
            } else {
                println!("NOT VERIFIED");
                println!(
                    "  Reason:   {}",
                    v.reason_code.as_deref().unwrap_or("unknown")
                );
            }
            println!("  Checked:  {}", v.checked_at);
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("verification failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("verification failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
