//! Sigil Node — entry point.
//!
//! Starts the credential anchoring node: HTTP API, background anchor worker,
//! and the configured ledger connection.

mod api;
mod config;
mod node;
mod ratelimit;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use sigil_crypto::Keypair;
use sigil_ledger::{JsonRpcClient, LedgerClient};

use api::{start_api_server, AppState};
use config::NodeConfig;
use node::SigilNode;

/// Sigil Node
#[derive(Parser, Debug)]
#[command(name = "sigil-node", version, about = "Sigil credential anchoring node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "sigil.toml")]
    config: PathBuf,

    /// Override the keypair file path.
    #[arg(long)]
    keypair: Option<PathBuf>,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

/// Load the signing keypair, generating and persisting one on first run.
fn load_or_create_keypair(path: &PathBuf) -> anyhow::Result<Keypair> {
    if path.exists() {
        let keypair = Keypair::load_from_file(path)?;
        tracing::info!(path = %path.display(), signer = %keypair.signer_id(), "loaded keypair");
        Ok(keypair)
    } else {
        let keypair = Keypair::generate();
        keypair.save_to_file(path)?;
        tracing::info!(
            path = %path.display(),
            signer = %keypair.signer_id(),
            "generated new keypair"
        );
        Ok(keypair)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Handle --init flag
    if args.init {
        let config = NodeConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration and apply CLI overrides
    let mut config = NodeConfig::load(&args.config)?;
    if let Some(ref keypair_path) = args.keypair {
        config.wallet.keypair_path = keypair_path.clone();
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cluster = %config.cluster(),
        "Sigil node starting"
    );

    let keypair = load_or_create_keypair(&config.wallet.keypair_path)?;
    let ledger: Arc<dyn LedgerClient> = Arc::new(JsonRpcClient::new(
        config.rpc_url()?,
        Duration::from_secs(config.ledger.request_timeout_secs),
    )?);

    let (node, job_rx) = SigilNode::new(&config, keypair, ledger);
    let worker = tokio::spawn(node.clone().run_worker(job_rx));

    let state = Arc::new(AppState::new(node, &config));
    let api_addr = config.api_addr()?;

    // Graceful shutdown on SIGINT
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = start_api_server(api_addr, state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "api server error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    worker.abort();
    tracing::info!("Sigil node exited cleanly");
    Ok(())
}
