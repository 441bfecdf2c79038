//! Wallet monitoring: balance queries, funding tiers, and the preflight gate
//! the anchor loop runs before spending.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use sigil_crypto::SignerId;
use sigil_ledger::{Lamports, LedgerClient};

use crate::error::WalletError;

/// Funding tiers for the anchoring wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceTier {
    Healthy,
    Low,
    Critical,
}

impl BalanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Low => "low",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for BalanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the wallet at query time. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatus {
    pub balance: Lamports,
    pub tier: BalanceTier,
}

/// Tier boundaries in lamports. A balance below `critical` is critical,
/// below `low` is low, anything else healthy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletThresholds {
    pub critical: Lamports,
    pub low: Lamports,
}

impl Default for WalletThresholds {
    fn default() -> Self {
        Self {
            // 0.01 SOL and 0.1 SOL.
            critical: Lamports(10_000_000),
            low: Lamports(100_000_000),
        }
    }
}

/// Read-only view of the anchoring wallet's funding state.
pub struct WalletMonitor {
    ledger: Arc<dyn LedgerClient>,
    signer: SignerId,
    thresholds: WalletThresholds,
}

impl WalletMonitor {
    pub fn new(ledger: Arc<dyn LedgerClient>, signer: SignerId) -> Self {
        Self {
            ledger,
            signer,
            thresholds: WalletThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: WalletThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn signer(&self) -> SignerId {
        self.signer
    }

    /// Current balance of the signing account.
    pub async fn balance(&self) -> Result<Lamports, WalletError> {
        Ok(self.ledger.balance(&self.signer).await?)
    }

    /// Classify a balance against the configured thresholds.
    pub fn classify(&self, balance: Lamports) -> BalanceTier {
        if balance < self.thresholds.critical {
            BalanceTier::Critical
        } else if balance < self.thresholds.low {
            BalanceTier::Low
        } else {
            BalanceTier::Healthy
        }
    }

    /// Balance plus tier, recomputed on demand.
    pub async fn status(&self) -> Result<WalletStatus, WalletError> {
        let balance = self.balance().await?;
        let tier = self.classify(balance);
        if tier != BalanceTier::Healthy {
            tracing::warn!(
                signer = %self.signer,
                balance = %balance,
                tier = %tier,
                "anchoring wallet balance is running low"
            );
        }
        Ok(WalletStatus { balance, tier })
    }

    /// Preflight gate: fail unless the balance covers `required`.
    /// Returns the observed balance on success.
    pub async fn ensure_minimum(&self, required: Lamports) -> Result<Lamports, WalletError> {
        let available = self.balance().await?;
        if available < required {
            return Err(WalletError::InsufficientFunds {
                available,
                required,
            });
        }
        Ok(available)
    }
}
