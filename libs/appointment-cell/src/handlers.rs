// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use hospital_cell::services::directory::DirectoryService;
use notification_cell::NotificationOutbox;
use shared_config::AppConfig;
use shared_models::auth::{AuthContext, User};
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentStatus, CompleteAppointmentRequest, CreateAppointmentRequest,
    DateQuery, HospitalQueueQuery,
};
use crate::services::approval::ApprovalService;
use crate::services::booking::BookingService;
use crate::services::completion::CompletionService;
use crate::services::slots::SlotLedger;

fn map_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::HospitalNotFound => AppError::NotFound("Hospital not found".to_string()),
        AppointmentError::DoctorNotInHospital => {
            AppError::BadRequest("Doctor does not belong to the requested hospital".to_string())
        }
        AppointmentError::DoctorUnavailable => {
            AppError::BadRequest("Doctor is not accepting new bookings".to_string())
        }
        AppointmentError::InvalidSlot(slot) => {
            AppError::ValidationError(format!("Unknown time slot: {}", slot))
        }
        AppointmentError::InvalidDate(msg) => AppError::ValidationError(msg),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::Unauthorized => {
            AppError::Auth("Not authorized for this appointment".to_string())
        }
        AppointmentError::StateConflict(status) => {
            AppError::Conflict(format!("Cannot transition from current status: {}", status))
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        AppointmentError::RoomProvisioningFailed { message, retryable } => {
            if retryable {
                AppError::ExternalService(message)
            } else {
                AppError::Internal(message)
            }
        }
    }
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Patients book for themselves; hospital staff may book on behalf of
    // a patient.
    let ctx = AuthContext::from_user(&user);
    let is_self = user.email.as_deref() == Some(request.patient_email.as_str());
    if !is_self && !ctx.is_admin() && !ctx.is_sub_admin() {
        return Err(AppError::Auth(
            "Not authorized to book for this patient".to_string(),
        ));
    }

    let booking_service = BookingService::new(&state);

    let response = booking_service
        .create_appointment(request, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": response.appointment_id,
        "payment_ref": response.payment_ref,
    })))
}

/// Busy slots for a doctor/date, for rendering the booking picker. Public:
/// patients consult it before authenticating their booking.
#[axum::debug_handler]
pub async fn get_busy_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let ledger = SlotLedger::new(&state);

    let busy = ledger
        .list_busy_slots(doctor_id, query.date, None)
        .await
        .map_err(map_error)?;

    Ok(Json(busy))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .get_appointment(appointment_id, Some(token))
        .await
        .map_err(map_error)?;

    let ctx = AuthContext::from_user(&user);
    let is_patient = user.email.as_deref() == Some(appointment.patient_email.as_str());
    let is_hospital_staff = ctx.is_sub_admin() && ctx.can_act_for_hospital(appointment.hospital_id);

    if !is_patient && !is_hospital_staff && !ctx.is_admin() {
        return Err(AppError::Auth("Not authorized to view this appointment".to_string()));
    }

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let email = user
        .email
        .ok_or_else(|| AppError::Auth("Token carries no email claim".to_string()))?;

    let booking_service = BookingService::new(&state);
    let appointments = booking_service
        .list_patient_appointments(&email, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

/// The hospital approval queue. Defaults to `paid` — the bookings waiting
/// at the gate.
#[axum::debug_handler]
pub async fn list_hospital_queue(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<HospitalQueueQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let ctx = AuthContext::from_user(&user);
    if !ctx.is_sub_admin() && !ctx.is_admin() {
        return Err(AppError::Auth("Hospital staff only".to_string()));
    }
    let hospital_id = ctx
        .hospital_id
        .ok_or_else(|| AppError::Auth("Token carries no hospital scope".to_string()))?;

    let status = params.status.unwrap_or(AppointmentStatus::Paid);

    let booking_service = BookingService::new(&state);
    let appointments = booking_service
        .list_hospital_appointments(hospital_id, status, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "hospital_id": hospital_id,
        "status": status,
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DateQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let directory = DirectoryService::new(&state);
    let doctor = directory
        .find_doctor_by_actor(&user.id, Some(token))
        .await
        .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

    let booking_service = BookingService::new(&state);
    let appointments = booking_service
        .list_doctor_schedule(doctor.id, query.date, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "doctor_id": doctor.id,
        "date": query.date,
        "appointments": appointments,
    })))
}

// ==============================================================================
// APPROVAL GATE AND COMPLETION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(outbox): Extension<NotificationOutbox>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let ctx = AuthContext::from_user(&user);

    let approval_service = ApprovalService::new(&state);
    let appointment = approval_service
        .approve(appointment_id, &ctx, &outbox, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "video_room_id": appointment.video_room_id,
    })))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(outbox): Extension<NotificationOutbox>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let ctx = AuthContext::from_user(&user);

    let approval_service = ApprovalService::new(&state);
    approval_service
        .reject(appointment_id, &ctx, &outbox, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let ctx = AuthContext::from_user(&user);

    let completion_service = CompletionService::new(&state);
    completion_service
        .complete(appointment_id, &ctx, request.note, token)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}
