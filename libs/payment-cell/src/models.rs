// libs/payment-cell/src/models.rs
use serde::{Deserialize, Serialize};

use appointment_cell::models::{Appointment, AppointmentStatus};

/// Header carrying the hex HMAC-SHA512 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// The only event kind that transitions an appointment.
pub const CHARGE_SUCCESS: &str = "charge.success";

// ==============================================================================
// WEBHOOK PAYLOAD MODELS
// ==============================================================================

/// Payment provider event, validated at the boundary. Unknown fields are
/// ignored; missing required fields reject the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    pub data: PaymentEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEventData {
    pub reference: String,
    /// Amount charged, in minor currency units.
    pub amount: i64,
    pub metadata: Option<PaymentMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub hospital_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

// ==============================================================================
// RECONCILIATION OUTCOMES
// ==============================================================================

#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// This delivery won the pending -> paid transition.
    Reconciled {
        appointment: Appointment,
        /// Other pending bookings still holding the same (doctor, date,
        /// slot); flagged for manual review, never auto-cancelled.
        unresolved_pending_siblings: Vec<i64>,
        amount_mismatch: bool,
    },
    /// The reference was already reconciled; duplicate delivery is a no-op.
    AlreadyProcessed { status: AppointmentStatus },
    /// No booking carries this reference; nothing is fabricated.
    ReferenceUnknown,
    /// The booking was cancelled before the payment arrived. Left for
    /// manual review (refund handling is out of scope).
    StaleReference { status: AppointmentStatus },
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Reconciled { .. } => "reconciled",
            ReconcileOutcome::AlreadyProcessed { .. } => "already_processed",
            ReconcileOutcome::ReferenceUnknown => "reference_unknown",
            ReconcileOutcome::StaleReference { .. } => "stale_reference",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
