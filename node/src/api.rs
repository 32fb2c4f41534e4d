// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # REST API
//!
//! The axum router in front of the [`SubmissionCoordinator`]. Handlers share
//! [`AppState`] through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Description                           |
//! |--------|------------------------|---------------------------------------|
//! | GET    | `/health`              | Liveness probe                        |
//! | POST   | `/transactions`        | Submit `{"tx": "<base64 envelope>"}`  |
//! | GET    | `/transactions/:hash`  | Result by content hash                |
//! | GET    | `/accounts/:address`   | Account snapshot (through the cache)  |
//!
//! ## Error mapping
//!
//! | Gateway error         | Status |
//! |-----------------------|--------|
//! | malformed, validation | 400    |
//! | network rejection     | 400    |
//! | busy, unavailable     | 503    |
//! | transient store error | 503    |
//! | other store error     | 500    |
//! | timeout               | 504    |

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use harbor_gateway::crypto::{is_hash_hex, is_valid_address};
use harbor_gateway::store::StoreError;
use harbor_gateway::{GatewayError, SubmissionCoordinator};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    /// Short network name (`public`, `testnet`, `custom`).
    pub network: String,
    pub gateway: Arc<SubmissionCoordinator>,
    pub metrics: SharedMetrics,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/transactions", post(submit_handler))
        .route("/transactions/:hash", get(transaction_by_hash_handler))
        .route("/accounts/:address", get(account_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Base64 transaction envelope.
    pub tx: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error class, e.g. `validation` or `timeout`.
    pub error: String,
    pub message: String,
    /// Validation rule that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Content hash, when the envelope got far enough to have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub retryable: bool,
}

impl ErrorResponse {
    fn simple(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            code: None,
            hash: None,
            retryable: false,
        }
    }
}

fn gateway_error_response(err: &GatewayError) -> Response {
    let status = match err {
        GatewayError::Malformed(_)
        | GatewayError::Validation(_)
        | GatewayError::NetworkRejection { .. } => StatusCode::BAD_REQUEST,
        GatewayError::NetworkBusy | GatewayError::NetworkUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        GatewayError::Store(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
    };

    let body = ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        code: match err {
            GatewayError::Validation(v) => Some(v.code().to_string()),
            _ => None,
        },
        hash: match err {
            GatewayError::Timeout { hash, .. } => Some(hash.clone()),
            _ => None,
        },
        retryable: err.is_retryable(),
    };
    (status, Json(body)).into_response()
}

fn store_error_response(err: &StoreError) -> Response {
    let status = if err.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let mut body = ErrorResponse::simple("store", err.to_string());
    body.retryable = err.is_transient();
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`. Liveness only, does not touch the stores.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        version: state.version.clone(),
        network: state.network.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `POST /transactions`. Blocks until a result, a refusal, or the
/// configured submit timeout.
async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    let started = Instant::now();
    let passphrase = state.gateway.config().network_passphrase.clone();
    let outcome = state.gateway.submit(&req.tx, &passphrase).await;
    state.metrics.observe_cache(state.gateway.accounts().stats());

    match outcome {
        Ok(result) => {
            state.metrics.record_submission("accepted", started.elapsed());
            state.metrics.record_result(result.source);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            state.metrics.record_submission(e.kind(), started.elapsed());
            tracing::info!(error = %e, kind = e.kind(), "submission refused");
            gateway_error_response(&e)
        }
    }
}

/// `GET /transactions/:hash`. An unknown hash is `found: false`, not 404:
/// the transaction may still be in flight.
async fn transaction_by_hash_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let hash = hash.to_ascii_lowercase();
    if !is_hash_hex(&hash) {
        let body = ErrorResponse::simple("invalid_hash", format!("not a transaction hash: {}", hash));
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    match state.gateway.result_by_hash(&hash).await {
        Ok(result) => {
            state.metrics.record_result(result.source);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => gateway_error_response(&e),
    }
}

/// `GET /accounts/:address`.
async fn account_handler(Path(address): Path<String>, State(state): State<AppState>) -> Response {
    if !is_valid_address(&address) {
        let body = ErrorResponse::simple("invalid_address", format!("not an address: {}", address));
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let lookup = state.gateway.accounts().get(&address).await;
    state.metrics.observe_cache(state.gateway.accounts().stats());

    match lookup {
        Ok(account) => {
            let account_type = account.kind().map(|t| t.as_str());
            let body = serde_json::json!({
                "id": account.id,
                "address": account.address,
                "account_type": account.account_type,
                "account_type_name": account_type,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(StoreError::NotFound) => {
            let body = ErrorResponse::simple("not_found", format!("account not found: {}", address));
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
