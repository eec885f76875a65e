//! REST API and webhook surface
//!
//! `POST /analyze` runs the full pipeline synchronously. The payment
//! confirmation webhook verifies the body signature before anything else;
//! a bad signature is rejected without touching the usage store. The social
//! webhook route only answers the verification handshake.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::payment;
use crate::storage::UsageStore;

/// Header carrying the payment webhook signature.
pub const PAYMENT_SIGNATURE_HEADER: &str = "x-cc-webhook-signature";

/// Shared state for all handlers.
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub store: Arc<dyn UsageStore>,
    pub payment_webhook_secret: Option<String>,
    pub social_webhook_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub url: String,
    #[serde(rename = "report_markdown")]
    pub report: String,
    pub analyzed_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CrcQuery {
    pub crc_token: String,
}

#[derive(Debug, Serialize)]
pub struct CrcResponse {
    pub response_token: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/webhooks/payment", post(payment_webhook))
        .route("/webhooks/social", get(social_crc))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(bind: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("API server listening on {}", bind);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    if request.url.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let report = state
        .analyzer
        .analyze(&request.url)
        .await
        .map_err(|e| {
            tracing::error!("Analysis failed for {}: {}", request.url, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(AnalyzeResponse {
        url: report.url,
        report: report.markdown,
        analyzed_at: Utc::now(),
        status: "ok".to_string(),
    }))
}

/// Payment confirmation webhook.
///
/// Signature mismatch → 401, nothing granted. A signed but malformed payload
/// is acknowledged with 200 so the processor stops retrying it.
async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(secret) = state.payment_webhook_secret.as_deref() else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "payments not configured"})),
        );
    };

    let signature = headers
        .get(PAYMENT_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let envelope = match payment::parse_webhook(secret, &body, signature) {
        Ok(envelope) => envelope,
        Err(crate::error::FlipError::SignatureInvalid) => {
            tracing::warn!("Payment webhook rejected: bad signature");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "invalid signature"})),
            );
        }
        Err(e) => {
            tracing::warn!("Payment webhook payload unreadable: {}", e);
            return (StatusCode::OK, Json(serde_json::json!({"received": true})));
        }
    };

    if envelope.event.is_confirmed() {
        if let Some(user_id) = envelope.event.user_id() {
            match state.store.grant_pro(user_id).await {
                Ok(()) => tracing::info!(user_id, "pro entitlement granted"),
                Err(e) => {
                    tracing::error!("Failed to grant pro for {}: {}", user_id, e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "store failure"})),
                    );
                }
            }
        } else {
            tracing::warn!("Confirmed payment without user_id metadata");
        }
    } else {
        tracing::debug!(event = %envelope.event.event_type, "ignoring payment event");
    }

    (StatusCode::OK, Json(serde_json::json!({"received": true})))
}

/// Social-media webhook verification handshake.
async fn social_crc(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CrcQuery>,
) -> Result<Json<CrcResponse>, StatusCode> {
    let secret = state
        .social_webhook_secret
        .as_deref()
        .ok_or(StatusCode::NOT_FOUND)?;

    let response_token = payment::crc_response_token(secret, &query.crc_token)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(CrcResponse { response_token }))
}
