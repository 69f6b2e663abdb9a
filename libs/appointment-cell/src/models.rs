// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// One booking attempt. Rows are never deleted; cancellation is a terminal
/// status, not a removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_email: String,
    pub hospital_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: AppointmentStatus,
    pub payment_ref: String,
    /// Minor currency units, stamped at reconciliation.
    pub amount_paid: Option<i64>,
    pub video_room_id: Option<String>,
    pub note: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Display name used in patient notifications.
    pub fn patient_name(&self) -> &str {
        self.patient_email
            .split('@')
            .next()
            .unwrap_or(&self.patient_email)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Paid,
    Approved,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Committed appointments occupy their slot for availability purposes.
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Paid | AppointmentStatus::Approved | AppointmentStatus::Completed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Paid => write!(f, "paid"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// SLOT CATALOGUE
// ==============================================================================

/// Fixed half-hour consultation slots. Booking requests must carry one of
/// these labels verbatim.
pub const TIME_SLOTS: [&str; 15] = [
    "09:00-09:30",
    "09:30-10:00",
    "10:00-10:30",
    "10:30-11:00",
    "11:00-11:30",
    "11:30-12:00",
    "12:00-12:30",
    "12:30-13:00",
    "13:00-13:30",
    "13:30-14:00",
    "14:00-14:30",
    "14:30-15:00",
    "15:00-15:30",
    "15:30-16:00",
    "16:00-16:30",
];

pub fn is_valid_time_slot(label: &str) -> bool {
    TIME_SLOTS.contains(&label)
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_email: String,
    pub hospital_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentResponse {
    pub appointment_id: i64,
    pub payment_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HospitalQueueQuery {
    pub status: Option<AppointmentStatus>,
}

/// Projection row for the busy-slot query.
#[derive(Debug, Clone, Deserialize)]
pub struct BusySlotRow {
    pub time_slot: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Hospital not found")]
    HospitalNotFound,

    #[error("Doctor does not belong to the requested hospital")]
    DoctorNotInHospital,

    #[error("Doctor is not accepting new bookings")]
    DoctorUnavailable,

    #[error("Unknown time slot: {0}")]
    InvalidSlot(String),

    #[error("Invalid appointment date: {0}")]
    InvalidDate(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Appointment cannot be modified in current status: {0}")]
    StateConflict(AppointmentStatus),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Video room provisioning failed: {message}")]
    RoomProvisioningFailed { message: String, retryable: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_labels_validate() {
        assert!(is_valid_time_slot("09:00-09:30"));
        assert!(is_valid_time_slot("16:00-16:30"));
        assert!(!is_valid_time_slot("16:30-17:00"));
        assert!(!is_valid_time_slot("9:00-9:30"));
        assert!(!is_valid_time_slot(""));
    }

    #[test]
    fn committed_statuses_block_the_slot() {
        assert!(!AppointmentStatus::Pending.is_committed());
        assert!(AppointmentStatus::Paid.is_committed());
        assert!(AppointmentStatus::Approved.is_committed());
        assert!(AppointmentStatus::Completed.is_committed());
        assert!(!AppointmentStatus::Cancelled.is_committed());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
        let back: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, AppointmentStatus::Cancelled);
    }

    #[test]
    fn patient_name_is_local_part_of_email() {
        let appt: Appointment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "patient_email": "ada.obi@example.com",
            "hospital_id": 1,
            "doctor_id": 7,
            "date": "2030-06-20",
            "time_slot": "09:00-09:30",
            "status": "pending",
            "payment_ref": "apt-1",
        }))
        .unwrap();
        assert_eq!(appt.patient_name(), "ada.obi");
    }
}
