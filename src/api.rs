//! HTTP surface of the scoring service.
//!
//! One operation: submit a transaction for scoring. Malformed payloads are
//! rejected by the JSON extractor before the service is invoked.

use crate::service::{ScoreError, ScoringService};
use crate::types::transaction::Transaction;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ScoringService>,
}

/// Response body for `POST /predict`
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub transaction_id: String,
    pub is_fraud: bool,
    pub message: String,
}

/// API error mapped to an HTTP status
#[derive(Debug)]
pub enum ApiError {
    InferenceError(String),
    StoreError(String),
}

impl From<ScoreError> for ApiError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::Inference(e) => ApiError::InferenceError(e.to_string()),
            ScoreError::Store(e) => ApiError::StoreError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InferenceError(msg) => {
                error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Inference failed")
            }
            ApiError::StoreError(msg) => {
                error!("Store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to record decision")
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Score a transaction.
async fn predict(
    State(state): State<AppState>,
    Json(tx): Json<Transaction>,
) -> Result<Json<PredictResponse>, ApiError> {
    let outcome = state.service.score(tx).await?;

    Ok(Json(PredictResponse {
        transaction_id: outcome.record.transaction_id,
        is_fraud: outcome.is_fraud,
        message: outcome.message.to_string(),
    }))
}

/// Build the router with middleware.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
