// libs/payment-cell/src/services/reconcile.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use appointment_cell::models::{Appointment, AppointmentStatus};
use hospital_cell::services::directory::DirectoryService;
use notification_cell::{Notification, NotificationOutbox, NotificationTemplate};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PaymentEvent, ReconcileError, ReconcileOutcome};

/// Applies a verified payment confirmation to the booking it references.
///
/// Runs under the service role: webhooks carry no user token. The
/// pending -> paid transition is a single conditional update keyed on the
/// payment reference, so at-least-once webhook delivery and concurrent
/// deliveries of the same event collapse to exactly one transition.
pub struct ReconciliationService {
    supabase: Arc<SupabaseClient>,
    directory: DirectoryService,
}

impl ReconciliationService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        Self { supabase, directory }
    }

    pub async fn reconcile(
        &self,
        event: &PaymentEvent,
        outbox: &NotificationOutbox,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let reference = event.data.reference.as_str();
        info!("Reconciling payment reference {}", reference);

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(AppointmentStatus::Paid));
        patch.insert("amount_paid".to_string(), json!(event.data.amount));
        // Stamp provider metadata when present; the booking remains the
        // source of truth otherwise.
        if let Some(metadata) = &event.data.metadata {
            if let Some(hospital_id) = metadata.hospital_id {
                patch.insert("hospital_id".to_string(), json!(hospital_id));
            }
            if let Some(doctor_id) = metadata.doctor_id {
                patch.insert("doctor_id".to_string(), json!(doctor_id));
            }
        }

        let path = format!(
            "/rest/v1/appointments?payment_ref=eq.{}&status=eq.pending",
            urlencoding::encode(reference)
        );
        let updated: Vec<Appointment> = self
            .supabase
            .mutate(Method::PATCH, &path, None, Value::Object(patch))
            .await
            .map_err(|e| ReconcileError::DatabaseError(e.to_string()))?;

        let appointment = match updated.into_iter().next() {
            Some(row) => row,
            None => return self.classify_missed_update(reference).await,
        };

        info!(
            "Appointment {} reconciled to paid for slot {} {}",
            appointment.id, appointment.date, appointment.time_slot
        );

        let amount_mismatch = self
            .check_amount(&appointment, event.data.amount)
            .await;

        let unresolved_pending_siblings = self.find_pending_siblings(&appointment).await?;
        if !unresolved_pending_siblings.is_empty() {
            warn!(
                "Slot {} {} for doctor {} still has unresolved pending bookings {:?}; flagged for manual review",
                appointment.date, appointment.time_slot, appointment.doctor_id,
                unresolved_pending_siblings
            );
        }

        self.notify_approver(&appointment, outbox).await;

        Ok(ReconcileOutcome::Reconciled {
            appointment,
            unresolved_pending_siblings,
            amount_mismatch,
        })
    }

    /// The conditional update touched nothing: either the reference is
    /// unknown, or the row has already moved past pending.
    async fn classify_missed_update(
        &self,
        reference: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let path = format!(
            "/rest/v1/appointments?payment_ref=eq.{}",
            urlencoding::encode(reference)
        );
        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ReconcileError::DatabaseError(e.to_string()))?;

        match rows.into_iter().next() {
            None => {
                warn!("Payment reference not found: {}", reference);
                Ok(ReconcileOutcome::ReferenceUnknown)
            }
            Some(row) if row.status.is_committed() => {
                info!(
                    "Duplicate delivery for reference {} (already {}), no-op",
                    reference, row.status
                );
                Ok(ReconcileOutcome::AlreadyProcessed { status: row.status })
            }
            Some(row) => {
                warn!(
                    "Payment arrived for reference {} in status {}; flagged for manual review",
                    reference, row.status
                );
                Ok(ReconcileOutcome::StaleReference { status: row.status })
            }
        }
    }

    /// Competing pending bookings for the slot this payment just won.
    async fn find_pending_siblings(
        &self,
        appointment: &Appointment,
    ) -> Result<Vec<i64>, ReconcileError> {
        #[derive(serde::Deserialize)]
        struct IdRow {
            id: i64,
        }

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time_slot=eq.{}&status=eq.pending&id=neq.{}&select=id",
            appointment.doctor_id,
            appointment.date,
            urlencoding::encode(&appointment.time_slot),
            appointment.id
        );
        let rows: Vec<IdRow> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ReconcileError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    /// The charged amount is verified upstream by the provider; here it is
    /// only compared against the doctor's fee for audit purposes.
    async fn check_amount(&self, appointment: &Appointment, amount: i64) -> bool {
        match self.directory.get_doctor(appointment.doctor_id, None).await {
            Ok(doctor) if doctor.fee != amount => {
                warn!(
                    "Amount mismatch for appointment {}: charged {} vs fee {}",
                    appointment.id, amount, doctor.fee
                );
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(
                    "Could not verify amount for appointment {}: {}",
                    appointment.id, e
                );
                false
            }
        }
    }

    /// Alert the hospital-side approver that a paid booking awaits the
    /// gate. Lookup failures are logged and swallowed: the transition has
    /// already been committed and must not be rolled back by a side effect.
    async fn notify_approver(&self, appointment: &Appointment, outbox: &NotificationOutbox) {
        let doctor = self.directory.get_doctor(appointment.doctor_id, None).await;
        let hospital = self
            .directory
            .get_hospital(appointment.hospital_id, None)
            .await;

        let (doctor, hospital) = match (doctor, hospital) {
            (Ok(d), Ok(h)) => (d, h),
            _ => {
                warn!(
                    "Skipping approver notification for appointment {}: doctor/hospital lookup failed",
                    appointment.id
                );
                return;
            }
        };

        let Some(to_email) = hospital.contact_email.clone() else {
            warn!(
                "Hospital {} has no contact email; approver not notified for appointment {}",
                hospital.id, appointment.id
            );
            return;
        };

        outbox.enqueue(Notification {
            to_email,
            to_phone: hospital.contact_phone.clone(),
            template: NotificationTemplate::PaymentReceived {
                patient_email: appointment.patient_email.clone(),
                doctor_name: doctor.full_name,
                date: appointment.date.to_string(),
                time_slot: appointment.time_slot.clone(),
                hospital_name: hospital.name,
            },
        });
    }
}
