//! Sigil CLI — Command-line interface for credential anchoring.
//!
//! Subcommands: keygen, hash, issue, get, verify, retry, revoke, balance,
//! status, issuers, register.

mod commands;

use clap::{Parser, Subcommand};

/// Sigil — Credential anchoring and verification.
#[derive(Parser, Debug)]
#[command(name = "sigil", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a signing keypair file.
    Keygen(commands::keygen::KeygenArgs),
    /// Compute a credential's canonical form and digest locally.
    Hash(commands::hash::HashArgs),
    /// Issue a credential through a running node.
    Issue(commands::issue::IssueArgs),
    /// Fetch a credential and its anchoring state.
    Get(commands::get::GetArgs),
    /// Verify a credential against the ledger.
    Verify(commands::verify::VerifyArgs),
    /// Retry anchoring a failed credential (admin).
    Retry(commands::retry::RetryArgs),
    /// Revoke an anchored credential (admin).
    Revoke(commands::revoke::RevokeArgs),
    /// Show the node's anchoring wallet balance.
    Balance(commands::balance::BalanceArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
    /// List the node's registered issuers (admin).
    Issuers(commands::issuers::IssuersArgs),
    /// Register an issuer on the node (admin).
    Register(commands::register::RegisterArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Hash(args) => commands::hash::run(args),
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Get(args) => commands::get::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::Retry(args) => commands::retry::run(args).await,
        Commands::Revoke(args) => commands::revoke::run(args).await,
        Commands::Balance(args) => commands::balance::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Issuers(args) => commands::issuers::run(args).await,
        Commands::Register(args) => commands::register::run(args).await,
    }
}
