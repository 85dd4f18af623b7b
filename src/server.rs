//! Webhook HTTP surface.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tracing::{debug, info, warn};

use crate::pipeline::Processor;
use crate::telegram::update::TelegramUpdate;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub processor: Arc<Processor>,
}

/// Build the webhook router.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook/telegram", post(handle_update))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// POST /webhook/telegram
///
/// Always acks 200: a non-success status would make Telegram redeliver the
/// update, and the pipeline has no idempotency to absorb a replay.
/// Malformed bodies and updates without a `message` are acked and dropped.
async fn handle_update(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "Ignoring malformed webhook body");
            return StatusCode::OK;
        }
    };
    let update_id = update.update_id;

    let Some(message) = update.into_inbound() else {
        debug!(?update_id, "Update carries no message; ignoring");
        return StatusCode::OK;
    };

    // Processed synchronously to completion; each update is independent.
    match state.processor.process(message).await {
        Ok(outcome) => info!(?update_id, ?outcome, "Update processed"),
        Err(e) => warn!(?update_id, error = %e, "Update dropped"),
    }

    StatusCode::OK
}
