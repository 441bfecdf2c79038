use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use sigil_core::TxRef;
use sigil_crypto::{Keypair, Signature, SignerId};

use crate::error::LedgerError;

/// Lamports, the ledger's smallest balance unit. 1 SOL = 10^9 lamports.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// A balance or transfer amount in lamports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Lamports(pub u64);

impl Lamports {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Human-friendly SOL value for display only.
    pub fn to_sol(&self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recent sequencing token (blockhash) proving a transaction was built
/// against fresh ledger state. Time sensitive; fetched immediately before
/// signing and never reused across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencingToken(pub String);

impl SequencingToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequencingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The target ledger cluster. Determines chain identifiers and explorer URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Custom(String),
}

impl Cluster {
    /// Parse the cluster name used in configuration. Unrecognized names
    /// become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s {
            "devnet" => Self::Devnet,
            "testnet" => Self::Testnet,
            "mainnet-beta" => Self::MainnetBeta,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
            Self::Custom(name) => name,
        }
    }

    /// Chain identifier recorded on credentials (e.g. "solana-devnet").
    pub fn chain_id(&self) -> String {
        match self {
            Self::MainnetBeta => "solana-mainnet".to_string(),
            other => format!("solana-{}", other.name()),
        }
    }

    /// Human-viewable explorer link for a transaction.
    pub fn explorer_url(&self, tx_ref: &TxRef) -> String {
        match self {
            Self::MainnetBeta => format!("https://explorer.solana.com/tx/{}", tx_ref),
            Self::Custom(_) => format!("https://explorer.solana.com/tx/{}?cluster=custom", tx_ref),
            other => format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                tx_ref,
                other.name()
            ),
        }
    }

    /// Public RPC endpoint for the well-known clusters.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        match self {
            Self::Devnet => Some("https://api.devnet.solana.com"),
            Self::Testnet => Some("https://api.testnet.solana.com"),
            Self::MainnetBeta => Some("https://api.mainnet-beta.solana.com"),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Cluster {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Cluster {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// The unsigned payload of an anchoring transaction: a minimal self-transfer
/// carrying a memo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub payer: SignerId,
    pub recipient: SignerId,
    pub lamports: Lamports,
    pub memo: String,
    pub sequencing_token: SequencingToken,
}

impl TransactionRequest {
    /// The canonical bytes that get signed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self)
            .map_err(|e| LedgerError::MalformedResponse(format!("request encoding failed: {}", e)))
    }
}

/// A signed transaction ready for submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub request: TransactionRequest,
    /// Base58 ed25519 signature over the request bytes.
    pub signature: String,
}

impl SignedTransaction {
    /// Sign a request with the payer's key.
    pub fn sign(request: TransactionRequest, keypair: &Keypair) -> Result<Self, LedgerError> {
        let bytes = request.to_bytes()?;
        let signature = sigil_crypto::sign(&bytes, keypair).to_bs58();
        Ok(Self { request, signature })
    }

    /// Verify the signature against the request's payer.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let bytes = self.request.to_bytes()?;
        let signature =
            Signature::from_bs58(&self.signature).map_err(|_| LedgerError::InvalidSignature)?;
        sigil_crypto::verify(&bytes, &signature, &self.request.payer)
            .map_err(|_| LedgerError::InvalidSignature)
    }

    /// Base64 wire encoding used for submission.
    pub fn encode_base64(&self) -> Result<String, LedgerError> {
        let bytes = serde_json::to_vec(self).map_err(|e| {
            LedgerError::MalformedResponse(format!("transaction encoding failed: {}", e))
        })?;
        Ok(BASE64.encode(bytes))
    }

    /// Decode the base64 wire form.
    pub fn decode_base64(encoded: &str) -> Result<Self, LedgerError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| LedgerError::MalformedResponse(format!("invalid base64: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::MalformedResponse(format!("transaction decoding failed: {}", e))
        })
    }
}

/// A transaction as read back from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub signature: TxRef,
    /// The fee-paying signer account.
    pub signer: SignerId,
    pub memo: Option<String>,
    pub slot: u64,
    pub block_time: Option<i64>,
}
