use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use hospital_cell::router::hospital_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "HealthMate booking API is running!" }))
        .nest("/hospitals", hospital_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
}
