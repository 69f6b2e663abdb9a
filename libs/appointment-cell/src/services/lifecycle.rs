// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// The booking state machine.
///
/// Statuses walk forward along pending -> paid -> approved -> completed,
/// with cancellation reachable from every non-terminal status. Each actor
/// owns exactly one edge: the payment reconciler flips pending -> paid, the
/// approval gate flips paid -> approved/cancelled, the owning doctor flips
/// approved -> completed.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Pending => {
                &[AppointmentStatus::Paid, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Approved => {
                &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Paid => {
                &[AppointmentStatus::Approved, AppointmentStatus::Cancelled]
            }
            // Terminal states
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn validate_transition(
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !Self::valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(AppointmentError::StateConflict(current));
        }

        Ok(())
    }
}
