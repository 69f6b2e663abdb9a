// libs/hospital-cell/src/services/availability.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, HospitalError};
use crate::services::directory::DirectoryService;

/// Doctor-side toggle that gates whether new bookings may target the
/// doctor. Flipping it never touches existing appointments.
pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    directory: DirectoryService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        Self { supabase, directory }
    }

    pub async fn get_availability(
        &self,
        actor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<bool, HospitalError> {
        let doctor = self.directory.find_doctor_by_actor(actor_id, auth_token).await?;
        Ok(doctor.available)
    }

    pub async fn set_availability(
        &self,
        actor_id: &str,
        available: bool,
        auth_token: Option<&str>,
    ) -> Result<Doctor, HospitalError> {
        debug!("Setting availability for actor {} to {}", actor_id, available);

        let path = format!(
            "/rest/v1/doctors?actor_id=eq.{}",
            urlencoding::encode(actor_id)
        );
        let updated: Vec<Doctor> = self
            .supabase
            .mutate(
                Method::PATCH,
                &path,
                auth_token,
                json!({ "available": available }),
            )
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        let doctor = updated
            .into_iter()
            .next()
            .ok_or(HospitalError::DoctorNotFound)?;

        info!("Doctor {} availability set to {}", doctor.id, doctor.available);
        Ok(doctor)
    }
}
