// libs/payment-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// No auth middleware here: the webhook authenticates itself with the
/// shared-secret signature over the raw body.
pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/webhook", post(handlers::payment_webhook))
        .with_state(state)
}
