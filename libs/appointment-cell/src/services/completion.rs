// libs/appointment-cell/src/services/completion.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::info;

use hospital_cell::services::directory::DirectoryService;
use hospital_cell::HospitalError;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::AuthContext;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::booking::BookingService;
use crate::services::lifecycle::AppointmentLifecycle;

/// Doctor-side close-out of an approved consultation.
pub struct CompletionService {
    supabase: Arc<SupabaseClient>,
    directory: DirectoryService,
    booking: BookingService,
}

impl CompletionService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        let booking = BookingService::with_client(Arc::clone(&supabase));
        Self {
            supabase,
            directory,
            booking,
        }
    }

    /// Ownership is checked by doctor id, not hospital: only the doctor the
    /// appointment was booked with may complete it. The update keeps the
    /// `doctor_id` and `status` filters so a stale read can never complete
    /// someone else's row.
    pub async fn complete(
        &self,
        appointment_id: i64,
        ctx: &AuthContext,
        note: Option<String>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let doctor = self
            .directory
            .find_doctor_by_actor(&ctx.actor_id, Some(auth_token))
            .await
            .map_err(|e| match e {
                HospitalError::DoctorNotFound => AppointmentError::DoctorNotFound,
                HospitalError::HospitalNotFound => AppointmentError::HospitalNotFound,
                HospitalError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
            })?;

        let appointment = self
            .booking
            .get_appointment(appointment_id, Some(auth_token))
            .await?;

        if appointment.doctor_id != doctor.id {
            return Err(AppointmentError::Unauthorized);
        }

        AppointmentLifecycle::validate_transition(appointment.status, AppointmentStatus::Completed)?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&doctor_id=eq.{}&status=eq.approved",
            appointment_id, doctor.id
        );
        let updated: Vec<Appointment> = self
            .supabase
            .mutate(
                Method::PATCH,
                &path,
                Some(auth_token),
                json!({
                    "status": AppointmentStatus::Completed,
                    "note": note,
                    "completed_at": Utc::now(),
                }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match updated.into_iter().next() {
            Some(row) => {
                info!("Appointment {} completed by doctor {}", appointment_id, doctor.id);
                Ok(row)
            }
            None => {
                let current = self
                    .booking
                    .get_appointment(appointment_id, Some(auth_token))
                    .await?;
                Err(AppointmentError::StateConflict(current.status))
            }
        }
    }
}
