//! JSON-RPC 2.0 client for the anchoring ledger.
//!
//! Speaks the ledger's HTTP interface: `getBalance`, `getLatestBlockhash`,
//! `sendTransaction`, `getSignatureStatuses`, and `getTransaction`. RPC error
//! objects are mapped to typed `LedgerError` kinds by code and by the
//! structured `data.err` discriminant, never by matching message text.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use sigil_core::TxRef;
use sigil_crypto::SignerId;

use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::types::{Lamports, LedgerTransaction, SequencingToken, SignedTransaction};

/// Poll cadence while waiting for confirmation.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// HTTP JSON-RPC implementation of [`LedgerClient`].
pub struct JsonRpcClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl JsonRpcClient {
    /// Build a client with a per-request timeout.
    pub fn new(rpc_url: impl Into<String>, request_timeout: Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::Transport(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(LedgerError::Transport(format!("http {}", resp.status())));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("invalid json: {}", e)))?;

        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let mapped = classify_rpc_error(error);
            tracing::debug!(method = method, error = %mapped, "rpc error");
            return Err(mapped);
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::MalformedResponse("missing result field".into()))
    }
}

#[async_trait]
impl LedgerClient for JsonRpcClient {
    async fn balance(&self, signer: &SignerId) -> Result<Lamports, LedgerError> {
        let result = self
            .rpc_call("getBalance", json!([signer.to_string()]))
            .await?;
        parse_balance(&result)
    }

    async fn latest_sequencing_token(&self) -> Result<SequencingToken, LedgerError> {
        let result = self
            .rpc_call("getLatestBlockhash", json!([{"commitment": "finalized"}]))
            .await?;
        parse_sequencing_token(&result)
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxRef, LedgerError> {
        let encoded = tx.encode_base64()?;
        let result = self
            .rpc_call("sendTransaction", json!([encoded, {"encoding": "base64"}]))
            .await?;
        result
            .as_str()
            .map(TxRef::new)
            .ok_or_else(|| LedgerError::MalformedResponse("sendTransaction returned non-string".into()))
    }

    async fn await_confirmation(
        &self,
        tx_ref: &TxRef,
        timeout: Duration,
    ) -> Result<(), LedgerError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let result = self
                .rpc_call("getSignatureStatuses", json!([[tx_ref.as_str()]]))
                .await?;
            if let Poll::Confirmed = parse_signature_status(&result)? {
                return Ok(());
            }
            if tokio::time::Instant::now() + CONFIRM_POLL_INTERVAL > deadline {
                return Err(LedgerError::ConfirmationTimeout(timeout));
            }
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }

    async fn fetch_transaction(
        &self,
        tx_ref: &TxRef,
    ) -> Result<Option<LedgerTransaction>, LedgerError> {
        let result = self
            .rpc_call(
                "getTransaction",
                json!([tx_ref.as_str(), {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}]),
            )
            .await?;
        parse_transaction(&result)
    }
}

/// Outcome of one confirmation poll.
enum Poll {
    Confirmed,
    Pending,
}

/// Map a JSON-RPC error object to a typed kind.
fn classify_rpc_error(error: &Value) -> LedgerError {
    if let Some(err) = error.pointer("/data/err").filter(|e| !e.is_null()) {
        return classify_transaction_err(err);
    }
    let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
    let reason = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown rpc error")
        .to_string();
    LedgerError::Rejected { code, reason }
}

/// Map a structured transaction error discriminant (a bare string or the
/// single key of an object variant) to a typed kind.
fn classify_transaction_err(err: &Value) -> LedgerError {
    let discriminant = match err {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.keys().next().map(String::as_str),
        _ => None,
    };
    match discriminant {
        Some("BlockhashNotFound") => LedgerError::TokenExpired,
        Some("InsufficientFundsForFee") => LedgerError::InsufficientFunds {
            available: Lamports(0),
            required: Lamports(0),
        },
        Some("SignatureFailure") => LedgerError::InvalidSignature,
        _ => LedgerError::Rejected {
            code: 0,
            reason: err.to_string(),
        },
    }
}

fn parse_balance(result: &Value) -> Result<Lamports, LedgerError> {
    result
        .get("value")
        .and_then(|v| v.as_u64())
        .map(Lamports)
        .ok_or_else(|| LedgerError::MalformedResponse("getBalance missing value".into()))
}

fn parse_sequencing_token(result: &Value) -> Result<SequencingToken, LedgerError> {
    result
        .pointer("/value/blockhash")
        .and_then(|v| v.as_str())
        .map(SequencingToken::new)
        .ok_or_else(|| {
            LedgerError::MalformedResponse("getLatestBlockhash missing blockhash".into())
        })
}

fn parse_signature_status(result: &Value) -> Result<Poll, LedgerError> {
    let status = result
        .get("value")
        .and_then(|v| v.get(0))
        .ok_or_else(|| LedgerError::MalformedResponse("missing signature status".into()))?;
    if status.is_null() {
        return Ok(Poll::Pending);
    }
    if let Some(err) = status.get("err").filter(|e| !e.is_null()) {
        return Err(classify_transaction_err(err));
    }
    match status.get("confirmationStatus").and_then(|s| s.as_str()) {
        Some("confirmed") | Some("finalized") => Ok(Poll::Confirmed),
        _ => Ok(Poll::Pending),
    }
}

fn parse_transaction(result: &Value) -> Result<Option<LedgerTransaction>, LedgerError> {
    if result.is_null() {
        return Ok(None);
    }

    let signature = result
        .pointer("/transaction/signatures/0")
        .and_then(|v| v.as_str())
        .map(TxRef::new)
        .ok_or_else(|| LedgerError::MalformedResponse("transaction missing signature".into()))?;

    let account_keys = result
        .pointer("/transaction/message/accountKeys")
        .and_then(|v| v.as_array())
        .ok_or_else(|| LedgerError::MalformedResponse("transaction missing account keys".into()))?;
    let signer = account_keys
        .iter()
        .find(|k| k.get("signer").and_then(|s| s.as_bool()).unwrap_or(false))
        .and_then(|k| k.get("pubkey"))
        .and_then(|p| p.as_str())
        .ok_or_else(|| LedgerError::MalformedResponse("transaction missing signer".into()))?;
    let signer = SignerId::parse(signer)
        .map_err(|e| LedgerError::MalformedResponse(format!("bad signer key: {}", e)))?;

    let memo = result
        .pointer("/transaction/message/instructions")
        .and_then(|v| v.as_array())
        .and_then(|instructions| {
            instructions.iter().find_map(|ix| {
                match ix.get("program").and_then(|p| p.as_str()) {
                    Some("spl-memo") => ix.get("parsed").and_then(|p| p.as_str()).map(String::from),
                    _ => None,
                }
            })
        });

    let slot = result.get("slot").and_then(|s| s.as_u64()).unwrap_or(0);
    let block_time = result.get("blockTime").and_then(|t| t.as_i64());

    Ok(Some(LedgerTransaction {
        signature,
        signer,
        memo,
        slot,
        block_time,
    }))
}
