//! HTTP API for the Sigil node.
//!
//! Public surface: health, status, credential creation/lookup, and the
//! unauthenticated rate-limited verify endpoint. Admin surface (retry-anchor,
//! revoke, issuer registration) is gated by a bearer token when one is
//! configured. "Not verified" is always a 200 with a reason code; error
//! statuses are reserved for infrastructure and contract violations.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sigil_anchor::WalletStatus;
use sigil_core::{AnchorStatus, CoreError, Credential, TxRef};
use sigil_crypto::SignerId;
use sigil_verify::{IssuerRecord, VerificationResult, Verifier};

use crate::config::NodeConfig;
use crate::node::{NewCredential, NodeError, SigilNode};
use crate::ratelimit::{InMemoryCounterStore, RateLimiter};

/// Shared state behind every handler.
pub struct AppState {
    node: Arc<SigilNode>,
    verify_limiter: RateLimiter,
    create_limiter: RateLimiter,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(node: Arc<SigilNode>, config: &NodeConfig) -> Self {
        let window = Duration::from_secs(config.ratelimit.window_secs);
        // Separate stores: the two limits count the same client identity
        // independently.
        Self {
            node,
            verify_limiter: RateLimiter::new(
                Arc::new(InMemoryCounterStore::new()),
                config.ratelimit.verify_per_window,
                window,
            ),
            create_limiter: RateLimiter::new(
                Arc::new(InMemoryCounterStore::new()),
                config.ratelimit.create_per_window,
                window,
            ),
            admin_token: config.api.admin_token.clone(),
        }
    }
}

// --- Errors ---

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An HTTP-mapped error, optionally carrying a `Retry-After` hint.
pub struct ApiError {
    status: StatusCode,
    message: String,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    fn throttled(retry_after: Duration) -> Self {
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: format!("rate limit exceeded, retry in {}s", secs),
            retry_after_secs: Some(secs),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<NodeError> for ApiError {
    fn from(err: NodeError) -> Self {
        let status = match &err {
            NodeError::NotFound(_) => StatusCode::NOT_FOUND,
            NodeError::Core(CoreError::InvalidStatusTransition { .. }) => StatusCode::CONFLICT,
            NodeError::Core(_) => StatusCode::BAD_REQUEST,
            NodeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(token) = &state.admin_token else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(token.as_str()) {
        Ok(())
    } else {
        Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid admin token",
        ))
    }
}

// --- Response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    pub chain_id: String,
    pub signer: SignerId,
    pub wallet: Option<WalletStatus>,
    pub credentials: usize,
    pub issuers: usize,
}

/// The blockchain half of credential responses.
#[derive(Serialize)]
#[serde(untagged)]
pub enum BlockchainEnvelope {
    #[serde(rename_all = "camelCase")]
    Anchored {
        transaction_ref: TxRef,
        explorer_url: String,
        chain_id: String,
    },
    Failed {
        status: &'static str,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    Pending {
        status: &'static str,
        chain_id: String,
    },
}

#[derive(Serialize)]
pub struct CredentialResponse {
    pub credential: Credential,
    pub blockchain: BlockchainEnvelope,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    /// Public credential fields; absent when the credential does not exist.
    pub credential: Option<serde_json::Value>,
    pub verification: VerificationResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterIssuerRequest {
    pub signer: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default = "default_trusted")]
    pub trusted: bool,
}

fn default_trusted() -> bool {
    true
}

#[derive(Serialize)]
pub struct IssuerResponse {
    pub signer: SignerId,
    #[serde(flatten)]
    pub record: IssuerRecord,
}

#[derive(Serialize)]
pub struct IssuersResponse {
    pub issuers: Vec<IssuerResponse>,
    pub count: usize,
}

fn blockchain_envelope(node: &SigilNode, credential: &Credential) -> BlockchainEnvelope {
    match (&credential.transaction_ref, credential.anchor_status) {
        // Revoked credentials keep their historical reference visible.
        (Some(tx_ref), AnchorStatus::Anchored) | (Some(tx_ref), AnchorStatus::Revoked) => {
            BlockchainEnvelope::Anchored {
                transaction_ref: tx_ref.clone(),
                explorer_url: node.cluster().explorer_url(tx_ref),
                chain_id: credential.chain_id.clone(),
            }
        }
        (_, AnchorStatus::Failed) => BlockchainEnvelope::Failed {
            status: "failed",
            error: credential
                .anchor_error
                .clone()
                .unwrap_or_else(|| "anchoring failed".into()),
        },
        _ => BlockchainEnvelope::Pending {
            status: "pending",
            chain_id: credential.chain_id.clone(),
        },
    }
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let node = &state.node;
    let wallet = node.wallet().status().await.ok();
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_id: node.cluster().chain_id(),
        signer: node.signer(),
        wallet,
        credentials: node
            .store()
            .count()
            .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
        issuers: node.registry().list().len(),
    }))
}

async fn handle_wallet(State(state): State<Arc<AppState>>) -> Result<Json<WalletStatus>, ApiError> {
    state
        .node
        .wallet()
        .status()
        .await
        .map(Json)
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))
}

async fn handle_create_credential(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<NewCredential>,
) -> Result<(StatusCode, Json<CredentialResponse>), ApiError> {
    state
        .create_limiter
        .check(&addr.ip().to_string())
        .map_err(ApiError::throttled)?;

    let credential = state.node.issue_credential(req).await?;
    let blockchain = blockchain_envelope(&state.node, &credential);
    Ok((
        StatusCode::CREATED,
        Json(CredentialResponse {
            credential,
            blockchain,
        }),
    ))
}

async fn handle_get_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CredentialResponse>, ApiError> {
    let credential = state
        .node
        .store()
        .get(&id)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("credential not found: {}", id)))?;
    let blockchain = blockchain_envelope(&state.node, &credential);
    Ok(Json(CredentialResponse {
        credential,
        blockchain,
    }))
}

async fn handle_verify(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    state
        .verify_limiter
        .check(&addr.ip().to_string())
        .map_err(ApiError::throttled)?;

    let credential = state
        .node
        .store()
        .get(&id)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let verification = state
        .node
        .verifier()
        .verify(&id)
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(VerifyResponse {
        credential: credential.as_ref().map(Verifier::public_view),
        verification,
    }))
}

async fn handle_retry_anchor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CredentialResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let current = state
        .node
        .store()
        .get(&id)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("credential not found: {}", id)))?;
    if current.anchor_status != AnchorStatus::Failed {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            format!(
                "retry-anchor requires status failed, credential is {}",
                current.anchor_status
            ),
        ));
    }

    let credential = state.node.anchor_credential(&id).await?;
    let blockchain = blockchain_envelope(&state.node, &credential);
    Ok(Json(CredentialResponse {
        credential,
        blockchain,
    }))
}

async fn handle_revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CredentialResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let credential = state.node.revoke_credential(&id)?;
    let blockchain = blockchain_envelope(&state.node, &credential);
    Ok(Json(CredentialResponse {
        credential,
        blockchain,
    }))
}

async fn handle_register_issuer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterIssuerRequest>,
) -> Result<(StatusCode, Json<IssuerResponse>), ApiError> {
    require_admin(&state, &headers)?;
    let signer = SignerId::parse(&req.signer)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("invalid signer: {}", e)))?;
    let record = IssuerRecord {
        name: req.name,
        logo_url: req.logo_url,
        website_url: req.website_url,
        trusted: req.trusted,
    };
    state.node.registry().register(signer, record.clone());
    Ok((StatusCode::CREATED, Json(IssuerResponse { signer, record })))
}

async fn handle_list_issuers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<IssuersResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let issuers: Vec<IssuerResponse> = state
        .node
        .registry()
        .list()
        .into_iter()
        .map(|(signer, record)| IssuerResponse { signer, record })
        .collect();
    let count = issuers.len();
    Ok(Json(IssuersResponse { issuers, count }))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/wallet", get(handle_wallet))
        .route("/api/v1/credentials", post(handle_create_credential))
        .route("/api/v1/credentials/{id}", get(handle_get_credential))
        .route("/api/v1/verify/{id}", get(handle_verify))
        .route(
            "/api/v1/credentials/{id}/retry-anchor",
            post(handle_retry_anchor),
        )
        .route("/api/v1/credentials/{id}/revoke", post(handle_revoke))
        .route(
            "/api/v1/issuers",
            get(handle_list_issuers).post(handle_register_issuer),
        )
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    if state.admin_token.is_none() {
        tracing::warn!("no admin token configured; admin routes are open (development mode)");
    }
    let app =
        build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "http api server started");
    axum::serve(listener, app).await?;
    Ok(())
}
