// libs/hospital-cell/src/services/directory.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, Hospital, HospitalError};

pub struct DirectoryService {
    supabase: Arc<SupabaseClient>,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn list_hospitals(&self, auth_token: Option<&str>) -> Result<Vec<Hospital>, HospitalError> {
        debug!("Listing hospitals");

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/hospitals?order=name.asc", auth_token, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        parse_rows(result)
    }

    pub async fn get_hospital(
        &self,
        hospital_id: i64,
        auth_token: Option<&str>,
    ) -> Result<Hospital, HospitalError> {
        let path = format!("/rest/v1/hospitals?id=eq.{}", hospital_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        parse_rows::<Hospital>(result)?
            .into_iter()
            .next()
            .ok_or(HospitalError::HospitalNotFound)
    }

    pub async fn list_doctors(
        &self,
        hospital_id: i64,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>, HospitalError> {
        debug!("Listing doctors for hospital {}", hospital_id);

        let path = format!(
            "/rest/v1/doctors?hospital_id=eq.{}&order=full_name.asc",
            hospital_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        parse_rows(result)
    }

    pub async fn get_doctor(
        &self,
        doctor_id: i64,
        auth_token: Option<&str>,
    ) -> Result<Doctor, HospitalError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        parse_rows::<Doctor>(result)?
            .into_iter()
            .next()
            .ok_or(HospitalError::DoctorNotFound)
    }

    /// Resolve the doctor row belonging to an authenticated actor.
    pub async fn find_doctor_by_actor(
        &self,
        actor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Doctor, HospitalError> {
        debug!("Resolving doctor for actor {}", actor_id);

        let path = format!(
            "/rest/v1/doctors?actor_id=eq.{}",
            urlencoding::encode(actor_id)
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;

        parse_rows::<Doctor>(result)?
            .into_iter()
            .next()
            .ok_or(HospitalError::DoctorNotFound)
    }
}

fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, HospitalError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| HospitalError::DatabaseError(format!("Failed to parse rows: {}", e)))
}
