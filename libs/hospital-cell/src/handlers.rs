// libs/hospital-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvailabilityResponse, HospitalError, SetAvailabilityRequest};
use crate::services::availability::AvailabilityService;
use crate::services::directory::DirectoryService;

fn map_error(e: HospitalError) -> AppError {
    match e {
        HospitalError::HospitalNotFound => AppError::NotFound("Hospital not found".to_string()),
        HospitalError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        HospitalError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Public hospital directory used by the patient booking flow.
#[axum::debug_handler]
pub async fn list_hospitals(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let hospitals = directory.list_hospitals(None).await.map_err(map_error)?;

    Ok(Json(json!(hospitals)))
}

#[axum::debug_handler]
pub async fn list_hospital_doctors(
    State(state): State<Arc<AppConfig>>,
    Path(hospital_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    // 404 for an unknown hospital rather than an empty roster
    directory.get_hospital(hospital_id, None).await.map_err(map_error)?;

    let doctors = directory
        .list_doctors(hospital_id, None)
        .await
        .map_err(map_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let token = auth.token();

    let service = AvailabilityService::new(&state);
    let available = service
        .get_availability(&user.id, Some(token))
        .await
        .map_err(map_error)?;

    Ok(Json(AvailabilityResponse { available }))
}

#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = AvailabilityService::new(&state);
    let doctor = service
        .set_availability(&user.id, request.available, Some(token))
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "available": doctor.available
    })))
}
