use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{metrics_middleware, webhook_auth_middleware};
use super::{handlers, webhook};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Telegram pushes updates here; guarded by the secret token header
    let webhook_routes = Router::new()
        .route("/telegram/webhook", post(webhook::telegram_webhook))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            webhook_auth_middleware,
        ));

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .merge(webhook_routes)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
