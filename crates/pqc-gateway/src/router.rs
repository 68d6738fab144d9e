//! HTTP surface.
//!
//! Handlers are thin: parse, validate shape, hand the work to the blocking
//! pool, encode. Every failure is an [`ApiError`].

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pqc_crypto::encoding;
use pqc_telemetry::PqcMetrics;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::domain::config::LimitsConfig;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    DecapsulateRequest, DecapsulateResponse, EncapsulateRequest, EncapsulateResponse,
    HealthResponse, KeyGenRequest, KeyPairResponse, SignRequest, SignResponse, VerifyRequest,
    VerifyResponse,
};
use crate::middleware::{AdmissionPipeline, AllowListLayer, RateLimitLayer, TracingLayer};
use crate::operations::CryptoOperationService;
use crate::pool::{KeyPoolManager, PoolStatus};

/// Prefix of the rate-limited operation routes
pub const API_PREFIX: &str = "/api/v1/pqc";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub operations: Arc<CryptoOperationService>,
    pub pool: Arc<KeyPoolManager>,
    pub metrics: Arc<PqcMetrics>,
}

/// Assemble routes and middleware.
pub fn build_router(
    state: AppState,
    pipeline: Arc<AdmissionPipeline>,
    limits: &LimitsConfig,
) -> Router {
    let api = Router::new()
        .route("/keys", post(generate_keys))
        .route("/kem/encapsulate", post(encapsulate))
        .route("/kem/decapsulate", post(decapsulate))
        .route("/dsa/sign", post(sign))
        .route("/dsa/verify", post(verify))
        .route_layer(RateLimitLayer::new(Arc::clone(&pipeline)));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/pool", get(pool_status))
        .nest(API_PREFIX, api)
        .layer(DefaultBodyLimit::max(limits.max_request_size))
        .layer(AllowListLayer::new(pipeline))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TracingLayer::new())
        .with_state(state)
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|_| ApiError::malformed_json())
}

/// Run CPU-bound crypto off the async workers.
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!(panicked = e.is_panic(), "Crypto task did not complete");
        ApiError::internal()
    })
}

fn panic_response(_payload: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    ApiError::internal().into_response()
}

async fn generate_keys(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<KeyPairResponse>> {
    let request: KeyGenRequest = parse(&body)?;
    let family = request.validate()?;
    debug!(algorithm = %family, "Key generation requested");

    let operations = Arc::clone(&state.operations);
    let pair = run_blocking(move || operations.generate_keys(family)).await?;

    Ok(Json(KeyPairResponse {
        public_key: encoding::encode(pair.public_key()),
        private_key: encoding::encode(pair.private_key()),
    }))
}

async fn encapsulate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<EncapsulateResponse>> {
    let request: EncapsulateRequest = parse(&body)?;
    let public_key = request.validate()?.to_owned();

    let operations = Arc::clone(&state.operations);
    let encapsulation = run_blocking(move || operations.encapsulate(&public_key)).await??;

    Ok(Json(EncapsulateResponse {
        shared_secret: encoding::encode(&encapsulation.shared_secret),
        ciphertext: encoding::encode(&encapsulation.ciphertext),
    }))
}

async fn decapsulate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DecapsulateResponse>> {
    let request: DecapsulateRequest = parse(&body)?;
    let (private_key, ciphertext) = request.validate()?;
    let private_key = Zeroizing::new(private_key.to_owned());
    let ciphertext = ciphertext.to_owned();

    let operations = Arc::clone(&state.operations);
    let shared_secret =
        run_blocking(move || operations.decapsulate(&private_key, &ciphertext)).await??;

    Ok(Json(DecapsulateResponse {
        shared_secret: encoding::encode(&shared_secret),
    }))
}

async fn sign(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<SignResponse>> {
    let request: SignRequest = parse(&body)?;
    let (private_key, message) = request.validate()?;
    let private_key = Zeroizing::new(private_key.to_owned());
    let message = Zeroizing::new(message.as_bytes().to_vec());

    let operations = Arc::clone(&state.operations);
    let signature = run_blocking(move || operations.sign(&private_key, &message)).await??;

    Ok(Json(SignResponse {
        signature: encoding::encode(&signature),
    }))
}

async fn verify(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<VerifyResponse>> {
    let request: VerifyRequest = parse(&body)?;

    let operations = Arc::clone(&state.operations);
    let valid = run_blocking(move || {
        operations.verify(
            request.public_key(),
            request.message().as_bytes(),
            request.signature(),
        )
    })
    .await?;

    Ok(Json(VerifyResponse { valid }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let text = state.metrics.encode().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        ApiError::internal()
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}

async fn pool_status(State(state): State<AppState>) -> Json<PoolStatus> {
    Json(state.pool.status())
}
