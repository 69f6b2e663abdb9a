// libs/notification-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Message templates for the lifecycle transitions that notify someone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationTemplate {
    /// Hospital approver alert after a booking reconciles to paid.
    PaymentReceived {
        patient_email: String,
        doctor_name: String,
        date: String,
        time_slot: String,
        hospital_name: String,
    },
    /// Patient-facing outcome of the approval gate.
    AppointmentDecision {
        decision: Decision,
        patient_name: String,
        doctor_name: String,
        date: String,
        time_slot: String,
        hospital_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub to_email: String,
    pub to_phone: Option<String>,
    pub template: NotificationTemplate,
}

impl NotificationTemplate {
    pub fn subject(&self) -> String {
        match self {
            NotificationTemplate::PaymentReceived { .. } => {
                "New paid booking awaiting approval".to_string()
            }
            NotificationTemplate::AppointmentDecision { decision, .. } => match decision {
                Decision::Approved => "Appointment Approved!".to_string(),
                Decision::Rejected => "Appointment Update".to_string(),
            },
        }
    }

    pub fn html_body(&self) -> String {
        match self {
            NotificationTemplate::PaymentReceived {
                patient_email,
                doctor_name,
                date,
                time_slot,
                hospital_name,
            } => format!(
                "<p>A booking at <strong>{hospital_name}</strong> has been paid and is \
                 awaiting your approval.</p>\
                 <p><strong>Patient:</strong> {patient_email}</p>\
                 <p><strong>Doctor:</strong> Dr. {doctor_name}</p>\
                 <p><strong>Date:</strong> {date}</p>\
                 <p><strong>Time:</strong> {time_slot}</p>"
            ),
            NotificationTemplate::AppointmentDecision {
                decision,
                patient_name,
                doctor_name,
                date,
                time_slot,
                hospital_name,
            } => {
                let verb = match decision {
                    Decision::Approved => "approved",
                    Decision::Rejected => "rejected",
                };
                format!(
                    "<p>Hi {patient_name},</p>\
                     <p>Your appointment with <strong>Dr. {doctor_name}</strong> at \
                     <strong>{hospital_name}</strong> has been <strong>{verb}</strong>.</p>\
                     <p><strong>Date:</strong> {date}</p>\
                     <p><strong>Time:</strong> {time_slot}</p>\
                     <p>If you have questions, reply to this email or call the hospital.</p>"
                )
            }
        }
    }

    pub fn sms_body(&self) -> String {
        match self {
            NotificationTemplate::PaymentReceived {
                doctor_name,
                date,
                time_slot,
                ..
            } => format!(
                "New paid booking for Dr. {doctor_name} on {date} at {time_slot} awaits approval."
            ),
            NotificationTemplate::AppointmentDecision {
                decision,
                doctor_name,
                date,
                time_slot,
                ..
            } => match decision {
                Decision::Approved => format!(
                    "Your appointment with Dr. {doctor_name} on {date} at {time_slot} is APPROVED. See you soon!"
                ),
                Decision::Rejected => format!(
                    "Your appointment on {date} at {time_slot} has been cancelled. Please re-book."
                ),
            },
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification provider is not configured")]
    NotConfigured,

    #[error("Email delivery failed: {0}")]
    EmailFailed(String),

    #[error("SMS delivery failed: {0}")]
    SmsFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(decision: Decision) -> NotificationTemplate {
        NotificationTemplate::AppointmentDecision {
            decision,
            patient_name: "ada".to_string(),
            doctor_name: "Bello".to_string(),
            date: "2030-06-20".to_string(),
            time_slot: "09:00-09:30".to_string(),
            hospital_name: "St. Mary".to_string(),
        }
    }

    #[test]
    fn approved_template_mentions_doctor_and_slot() {
        let t = decision(Decision::Approved);
        assert_eq!(t.subject(), "Appointment Approved!");
        assert!(t.html_body().contains("Dr. Bello"));
        assert!(t.sms_body().contains("09:00-09:30"));
        assert!(t.sms_body().contains("APPROVED"));
    }

    #[test]
    fn rejected_template_asks_to_rebook() {
        let t = decision(Decision::Rejected);
        assert_eq!(t.subject(), "Appointment Update");
        assert!(t.sms_body().contains("re-book"));
    }

    #[test]
    fn payment_template_targets_the_approver() {
        let t = NotificationTemplate::PaymentReceived {
            patient_email: "pat@example.com".to_string(),
            doctor_name: "Bello".to_string(),
            date: "2030-06-20".to_string(),
            time_slot: "09:00-09:30".to_string(),
            hospital_name: "St. Mary".to_string(),
        };
        assert!(t.subject().contains("awaiting approval"));
        assert!(t.html_body().contains("pat@example.com"));
    }
}
