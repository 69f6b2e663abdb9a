// libs/hospital-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A practitioner scoped to exactly one hospital. `available` gates new
/// bookings only; appointments already created are unaffected by a toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub actor_id: String,
    pub hospital_id: i64,
    pub full_name: String,
    pub specialization: String,
    /// Consultation fee in minor currency units.
    pub fee: i64,
    pub available: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HospitalError {
    #[error("Hospital not found")]
    HospitalNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
