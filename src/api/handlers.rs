//! HTTP request handlers

use super::types::{HealthResponse, SessionSummary};
use super::AppState;
use crate::telegram::Update;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Telegram delivers updates here; both paths are accepted
        .route("/", post(receive_update))
        .route("/webhook", post(receive_update))
        .route("/health", get(get_health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

/// Always answers 200 so Telegram does not redeliver. The turn runs in the
/// background and queues behind the session lock.
async fn receive_update(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Discarding undecodable update");
            return StatusCode::OK;
        }
    };

    tracing::debug!(update_id = update.id, "Update received");
    let dispatcher = Arc::clone(&state.dispatcher);
    tokio::spawn(async move {
        dispatcher.handle(update).await;
    });

    StatusCode::OK
}

// ============================================================
// Health and version
// ============================================================

async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state
        .dispatcher
        .session()
        .try_lock()
        .ok()
        .map(|session| SessionSummary {
            state: session.state(),
            id: session.id().map(str::to_string),
            started_at: session.started_at(),
            model: session.model().to_string(),
            seed_messages: session.seed_len(),
            messages: session.history().len(),
        });

    Json(HealthResponse {
        status: "ok",
        started_at: state.started_at,
        session,
    })
}

async fn get_version() -> &'static str {
    concat!("shadow ", env!("CARGO_PKG_VERSION"))
}
