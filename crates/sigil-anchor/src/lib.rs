//! Sigil Anchor — wallet preflight and the anchoring attempt loop.

pub mod error;
pub mod service;
pub mod wallet;

pub use error::{AnchorError, WalletError};
pub use service::{AnchorConfig, AnchorReceipt, AnchorService};
pub use wallet::{BalanceTier, WalletMonitor, WalletStatus, WalletThresholds};
