//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sigil_anchor::{AnchorConfig, WalletThresholds};
use sigil_ledger::{Cluster, Lamports};

/// Full configuration for the Sigil node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// Ledger endpoint settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Anchoring wallet settings.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Anchor attempt loop settings.
    #[serde(default)]
    pub anchor: AnchorSettings,

    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Request throttling settings.
    #[serde(default)]
    pub ratelimit: RateLimitConfig,

    /// Issuers preloaded into the trust registry at startup.
    #[serde(default)]
    pub issuers: Vec<IssuerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint. Defaults to the cluster's public endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Target cluster (devnet, testnet, mainnet-beta).
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// Per-request timeout for ledger calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the signing keypair file.
    #[serde(default = "default_keypair_path")]
    pub keypair_path: PathBuf,
    /// Balance floor checked before every anchor attempt.
    #[serde(default = "default_min_anchor_balance")]
    pub min_anchor_balance_lamports: u64,
    /// Below this the wallet tier is `low`.
    #[serde(default = "default_low_balance")]
    pub low_balance_lamports: u64,
    /// Below this the wallet tier is `critical`.
    #[serde(default = "default_critical_balance")]
    pub critical_balance_lamports: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorSettings {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_per_attempt_timeout_secs")]
    pub per_attempt_timeout_secs: u64,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Self-transfer amount carried by each anchor transaction.
    #[serde(default = "default_transfer_lamports")]
    pub transfer_lamports: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token protecting admin routes. Left unset, admin routes are
    /// open and the node logs a startup warning (development mode).
    #[serde(default)]
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Public verify requests allowed per identity per window.
    #[serde(default = "default_verify_per_window")]
    pub verify_per_window: u64,
    /// Credential creations allowed per identity per window.
    #[serde(default = "default_create_per_window")]
    pub create_per_window: u64,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// One preloaded issuer registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerEntry {
    /// Base58 signer identity.
    pub signer: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default = "default_true")]
    pub trusted: bool,
}

// Default value functions
fn default_cluster() -> String {
    "devnet".into()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_keypair_path() -> PathBuf {
    PathBuf::from("sigil-keypair.json")
}
fn default_min_anchor_balance() -> u64 {
    10_000_000
}
fn default_low_balance() -> u64 {
    100_000_000
}
fn default_critical_balance() -> u64 {
    10_000_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_per_attempt_timeout_secs() -> u64 {
    30
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_max_delay_ms() -> u64 {
    8_000
}
fn default_transfer_lamports() -> u64 {
    1_000
}
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    8790
}
fn default_verify_per_window() -> u64 {
    10
}
fn default_create_per_window() -> u64 {
    30
}
fn default_window_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            cluster: default_cluster(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
            min_anchor_balance_lamports: default_min_anchor_balance(),
            low_balance_lamports: default_low_balance(),
            critical_balance_lamports: default_critical_balance(),
        }
    }
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            per_attempt_timeout_secs: default_per_attempt_timeout_secs(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            transfer_lamports: default_transfer_lamports(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
            admin_token: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            verify_per_window: default_verify_per_window(),
            create_per_window: default_create_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

impl NodeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: NodeConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The target cluster.
    pub fn cluster(&self) -> Cluster {
        Cluster::parse(&self.ledger.cluster)
    }

    /// The JSON-RPC endpoint, falling back to the cluster's public one.
    pub fn rpc_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.ledger.rpc_url {
            return Ok(url.clone());
        }
        self.cluster()
            .default_rpc_url()
            .map(String::from)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "cluster {:?} has no public rpc endpoint; set ledger.rpc_url",
                    self.ledger.cluster
                )
            })
    }

    /// The API socket address.
    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.api.listen_addr, self.api.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid api listen address: {}", e))
    }

    /// Anchor loop settings in `sigil-anchor` terms.
    pub fn anchor_config(&self) -> AnchorConfig {
        AnchorConfig {
            min_balance: Lamports(self.wallet.min_anchor_balance_lamports),
            transfer_lamports: Lamports(self.anchor.transfer_lamports),
            max_retries: self.anchor.max_retries,
            per_attempt_timeout: Duration::from_secs(self.anchor.per_attempt_timeout_secs),
            base_delay: Duration::from_millis(self.anchor.base_delay_ms),
            max_delay: Duration::from_millis(self.anchor.max_delay_ms),
            cluster: self.cluster(),
        }
    }

    /// Wallet tier thresholds in `sigil-anchor` terms.
    pub fn wallet_thresholds(&self) -> WalletThresholds {
        WalletThresholds {
            critical: Lamports(self.wallet.critical_balance_lamports),
            low: Lamports(self.wallet.low_balance_lamports),
        }
    }
}
