//! Telegram webhook endpoint.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::debug;

use crate::dispatcher::QueueError;
use crate::metrics::WEBHOOK_UPDATES_TOTAL;
use crate::state::AppState;
use crate::telegram::Update;
use lotsweep_core::Incoming;

/// Accept an update and queue it for the dispatcher.
///
/// Returns as soon as the update is queued; handling happens on the
/// dispatcher task. Updates the bot does not react to are acknowledged and
/// dropped. A full queue answers 503 so Telegram redelivers the update.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> StatusCode {
    let update_id = update.update_id;
    let Some(incoming) = update.into_incoming() else {
        WEBHOOK_UPDATES_TOTAL.with_label_values(&["ignored"]).inc();
        debug!(update_id, "Ignoring unsupported update");
        return StatusCode::OK;
    };

    let kind = match &incoming {
        Incoming::Message { .. } => "message",
        Incoming::Callback { .. } => "callback",
    };
    WEBHOOK_UPDATES_TOTAL.with_label_values(&[kind]).inc();

    match state.updates().enqueue(incoming) {
        Ok(()) => {
            debug!(update_id, kind, "Queued update");
            StatusCode::OK
        }
        Err(QueueError::Full) | Err(QueueError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
