// libs/appointment-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentError, BusySlotRow};

/// Read-only projection over committed appointments. This is advisory for
/// the booking UI, not a locking mechanism: the authoritative collision
/// resolution happens at payment reconciliation.
pub struct SlotLedger {
    supabase: Arc<SupabaseClient>,
}

impl SlotLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Time slots already taken for (doctor, date): the slots of
    /// appointments in a committed status. Cancelled and not-yet-paid
    /// bookings never block a slot.
    pub async fn list_busy_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<String>, AppointmentError> {
        debug!("Listing busy slots for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=in.(paid,approved,completed)&select=time_slot",
            doctor_id, date
        );

        let rows: Vec<BusySlotRow> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.time_slot).collect())
    }
}
