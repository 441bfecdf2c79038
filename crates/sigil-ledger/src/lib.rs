//! Sigil Ledger — the client boundary to the external anchoring ledger.
//!
//! `LedgerClient` is the trait the anchoring and verification layers program
//! against; `JsonRpcClient` speaks JSON-RPC 2.0 to a real endpoint and
//! `MockLedger` provides a deterministic in-memory stand-in for tests and
//! local development.

pub mod client;
pub mod error;
pub mod mock;
pub mod rpc;
pub mod types;

pub use client::LedgerClient;
pub use error::LedgerError;
pub use mock::MockLedger;
pub use rpc::JsonRpcClient;
pub use types::{
    Cluster, Lamports, LedgerTransaction, SequencingToken, SignedTransaction, TransactionRequest,
};
