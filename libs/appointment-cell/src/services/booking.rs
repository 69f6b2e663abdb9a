// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use hospital_cell::services::directory::DirectoryService;
use hospital_cell::HospitalError;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    is_valid_time_slot, Appointment, AppointmentError, AppointmentStatus,
    CreateAppointmentRequest, CreateAppointmentResponse,
};

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    directory: DirectoryService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        Self { supabase, directory }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        Self { supabase, directory }
    }

    /// Create a booking attempt in `pending` and hand back the payment
    /// reference the external processor will echo in its webhook.
    ///
    /// Slot-busy state is deliberately not checked here: the UI queries busy
    /// slots before offering a choice, and competing `pending` rows for one
    /// slot are resolved at reconciliation, where the first paid booking
    /// wins. A hard pre-payment reservation would let an abandoned checkout
    /// hold the slot hostage.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<CreateAppointmentResponse, AppointmentError> {
        info!(
            "Creating appointment for {} with doctor {} on {} {}",
            request.patient_email, request.doctor_id, request.date, request.time_slot
        );

        self.validate_booking_request(&request)?;

        let doctor = self
            .directory
            .get_doctor(request.doctor_id, Some(auth_token))
            .await
            .map_err(map_directory_error)?;

        if doctor.hospital_id != request.hospital_id {
            return Err(AppointmentError::DoctorNotInHospital);
        }
        if !doctor.available {
            return Err(AppointmentError::DoctorUnavailable);
        }

        let payment_ref = new_payment_reference();

        let inserted: Vec<Appointment> = self
            .supabase
            .mutate(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                json!({
                    "patient_email": request.patient_email,
                    "hospital_id": request.hospital_id,
                    "doctor_id": request.doctor_id,
                    "date": request.date,
                    "time_slot": request.time_slot,
                    "status": AppointmentStatus::Pending,
                    "payment_ref": payment_ref,
                }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = inserted
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no row".to_string()))?;

        info!(
            "Appointment {} created in pending with reference {}",
            appointment.id, appointment.payment_ref
        );

        Ok(CreateAppointmentResponse {
            appointment_id: appointment.id,
            payment_ref: appointment.payment_ref,
        })
    }

    fn validate_booking_request(&self, request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
        if request.patient_email.trim().is_empty() || !request.patient_email.contains('@') {
            return Err(AppointmentError::ValidationError(
                "A valid patient email is required".to_string(),
            ));
        }

        if !is_valid_time_slot(&request.time_slot) {
            return Err(AppointmentError::InvalidSlot(request.time_slot.clone()));
        }

        let today = Utc::now().date_naive();
        if request.date < today {
            return Err(AppointmentError::InvalidDate(format!(
                "{} is in the past",
                request.date
            )));
        }

        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: i64,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// A patient's own bookings, newest first.
    pub async fn list_patient_appointments(
        &self,
        patient_email: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_email=eq.{}&order=date.desc,time_slot.asc",
            urlencoding::encode(patient_email)
        );
        self.fetch_appointments(&path, Some(auth_token)).await
    }

    /// Hospital-side queue, defaulting to the paid bookings awaiting the
    /// approval gate.
    pub async fn list_hospital_appointments(
        &self,
        hospital_id: i64,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?hospital_id=eq.{}&status=eq.{}&order=date.asc,time_slot.asc",
            hospital_id, status
        );
        self.fetch_appointments(&path, Some(auth_token)).await
    }

    /// The day's consultation list for a doctor: approved plus completed.
    pub async fn list_doctor_schedule(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=in.(approved,completed)&order=time_slot.asc",
            doctor_id, date
        );
        self.fetch_appointments(&path, Some(auth_token)).await
    }

    async fn fetch_appointments(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }
}

/// Globally unique payment reference, echoed back by the payment provider's
/// webhook and used as the reconciliation idempotency key.
pub fn new_payment_reference() -> String {
    format!(
        "apt-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

fn map_directory_error(e: HospitalError) -> AppointmentError {
    match e {
        HospitalError::DoctorNotFound => AppointmentError::DoctorNotFound,
        HospitalError::HospitalNotFound => AppointmentError::HospitalNotFound,
        HospitalError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_references_are_unique_and_prefixed() {
        let a = new_payment_reference();
        let b = new_payment_reference();
        assert!(a.starts_with("apt-"));
        assert_ne!(a, b);
    }
}
