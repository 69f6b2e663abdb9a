// libs/hospital-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn hospital_routes(state: Arc<AppConfig>) -> Router {
    // Directory endpoints are public so patients can browse before login
    let public_routes = Router::new()
        .route("/", get(handlers::list_hospitals))
        .route("/{hospital_id}/doctors", get(handlers::list_hospital_doctors));

    let protected_routes = Router::new()
        .route("/doctor/availability", get(handlers::get_availability))
        .route("/doctor/availability", post(handlers::set_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
