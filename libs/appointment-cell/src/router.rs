// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Busy-slot projection is public so the picker can render before login
    let public_routes = Router::new()
        .route("/busy-slots/{doctor_id}", get(handlers::get_busy_slots));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/mine", get(handlers::list_my_appointments))
        .route("/hospital-queue", get(handlers::list_hospital_queue))
        .route("/schedule", get(handlers::get_doctor_schedule))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/approve", patch(handlers::approve_appointment))
        .route("/{appointment_id}/reject", patch(handlers::reject_appointment))
        .route("/{appointment_id}/complete", patch(handlers::complete_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
