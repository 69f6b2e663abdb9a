// libs/appointment-cell/src/services/approval.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use hospital_cell::services::directory::DirectoryService;
use notification_cell::{Decision, Notification, NotificationOutbox, NotificationTemplate};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::AuthContext;
use video_room_cell::VideoRoomClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::booking::BookingService;
use crate::services::lifecycle::AppointmentLifecycle;

/// Hospital-side gate that turns a paid booking into a scheduled,
/// room-assigned consultation, or rejects it.
pub struct ApprovalService {
    supabase: Arc<SupabaseClient>,
    directory: DirectoryService,
    booking: BookingService,
    video: Option<VideoRoomClient>,
}

impl ApprovalService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let directory = DirectoryService::with_client(Arc::clone(&supabase));
        let booking = BookingService::with_client(Arc::clone(&supabase));
        let video = VideoRoomClient::new(config).ok();

        Self {
            supabase,
            directory,
            booking,
            video,
        }
    }

    /// Approve a paid appointment and provision its consultation room.
    ///
    /// The status transition is persisted first under a conditional update
    /// (`status=eq.paid`), so concurrent approvals resolve to exactly one
    /// winner; the loser sees a state conflict. Room provisioning is a
    /// best-effort follow-up: on provider failure the row stays `approved`
    /// and a retried call re-runs only the allocation.
    pub async fn approve(
        &self,
        appointment_id: i64,
        ctx: &AuthContext,
        outbox: &NotificationOutbox,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.authorize(appointment_id, ctx, auth_token).await?;

        let approved = match appointment.status {
            // An earlier approval persisted the transition but the room
            // allocation failed; re-run only the follow-up.
            AppointmentStatus::Approved if appointment.video_room_id.is_none() => appointment,
            status => {
                AppointmentLifecycle::validate_transition(status, AppointmentStatus::Approved)?;

                let path = format!(
                    "/rest/v1/appointments?id=eq.{}&status=eq.paid",
                    appointment_id
                );
                let updated: Vec<Appointment> = self
                    .supabase
                    .mutate(
                        Method::PATCH,
                        &path,
                        Some(auth_token),
                        json!({
                            "status": AppointmentStatus::Approved,
                            "approved_at": Utc::now(),
                            "approved_by": ctx.actor_id,
                        }),
                    )
                    .await
                    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

                match updated.into_iter().next() {
                    Some(row) => {
                        info!("Appointment {} approved by {}", appointment_id, ctx.actor_id);
                        self.notify_patient(&row, Decision::Approved, auth_token, outbox)
                            .await;
                        row
                    }
                    None => {
                        // Guard did not match: a concurrent caller got here first.
                        let current = self.booking.get_appointment(appointment_id, Some(auth_token)).await?;
                        warn!(
                            "Approval race lost for appointment {} (now {})",
                            appointment_id, current.status
                        );
                        return Err(AppointmentError::StateConflict(current.status));
                    }
                }
            }
        };

        self.ensure_room(approved, auth_token).await
    }

    /// Reject a paid appointment. No room is ever allocated on this path.
    pub async fn reject(
        &self,
        appointment_id: i64,
        ctx: &AuthContext,
        outbox: &NotificationOutbox,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.authorize(appointment_id, ctx, auth_token).await?;

        AppointmentLifecycle::validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.paid",
            appointment_id
        );
        let updated: Vec<Appointment> = self
            .supabase
            .mutate(
                Method::PATCH,
                &path,
                Some(auth_token),
                json!({ "status": AppointmentStatus::Cancelled }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match updated.into_iter().next() {
            Some(row) => {
                info!("Appointment {} rejected by {}", appointment_id, ctx.actor_id);
                self.notify_patient(&row, Decision::Rejected, auth_token, outbox)
                    .await;
                Ok(row)
            }
            None => {
                let current = self.booking.get_appointment(appointment_id, Some(auth_token)).await?;
                Err(AppointmentError::StateConflict(current.status))
            }
        }
    }

    async fn authorize(
        &self,
        appointment_id: i64,
        ctx: &AuthContext,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        if !ctx.is_sub_admin() && !ctx.is_admin() {
            return Err(AppointmentError::Unauthorized);
        }

        let appointment = self
            .booking
            .get_appointment(appointment_id, Some(auth_token))
            .await?;

        if !ctx.can_act_for_hospital(appointment.hospital_id) {
            return Err(AppointmentError::Unauthorized);
        }

        Ok(appointment)
    }

    /// Provision `consult_<id>` and persist the SID. The persist is guarded
    /// on `video_room_id=is.null` so a racing repair never overwrites a
    /// room id that is already set.
    async fn ensure_room(
        &self,
        appointment: Appointment,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        if appointment.video_room_id.is_some() {
            return Ok(appointment);
        }

        let video = self
            .video
            .as_ref()
            .ok_or_else(|| AppointmentError::RoomProvisioningFailed {
                message: "video provider not configured".to_string(),
                retryable: false,
            })?;

        let room_name = format!("consult_{}", appointment.id);
        let room = video.create_room(&room_name).await.map_err(|e| {
            AppointmentError::RoomProvisioningFailed {
                message: e.to_string(),
                retryable: e.is_retryable(),
            }
        })?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.approved&video_room_id=is.null",
            appointment.id
        );
        let updated: Vec<Appointment> = self
            .supabase
            .mutate(
                Method::PATCH,
                &path,
                Some(auth_token),
                json!({ "video_room_id": room.sid }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match updated.into_iter().next() {
            Some(row) => Ok(row),
            None => {
                // Someone else persisted a room in the meantime; use theirs.
                self.booking.get_appointment(appointment.id, Some(auth_token)).await
            }
        }
    }

    /// Fire-and-forget: lookup failures are logged and the decision stands.
    async fn notify_patient(
        &self,
        appointment: &Appointment,
        decision: Decision,
        auth_token: &str,
        outbox: &NotificationOutbox,
    ) {
        let doctor = self
            .directory
            .get_doctor(appointment.doctor_id, Some(auth_token))
            .await;
        let hospital = self
            .directory
            .get_hospital(appointment.hospital_id, Some(auth_token))
            .await;

        let (doctor, hospital) = match (doctor, hospital) {
            (Ok(d), Ok(h)) => (d, h),
            _ => {
                warn!(
                    "Skipping decision notification for appointment {}: doctor/hospital lookup failed",
                    appointment.id
                );
                return;
            }
        };

        outbox.enqueue(Notification {
            to_email: appointment.patient_email.clone(),
            to_phone: None,
            template: NotificationTemplate::AppointmentDecision {
                decision,
                patient_name: appointment.patient_name().to_string(),
                doctor_name: doctor.full_name,
                date: appointment.date.to_string(),
                time_slot: appointment.time_slot.clone(),
                hospital_name: hospital.name,
            },
        });
    }
}
