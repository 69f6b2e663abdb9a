use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub payment_webhook_secret: String,
    pub video_api_base_url: String,
    pub email_api_base_url: String,
    pub sms_api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            payment_webhook_secret: "test-payment-webhook-secret".to_string(),
            video_api_base_url: "http://localhost:54322".to_string(),
            email_api_base_url: "http://localhost:54323".to_string(),
            sms_api_base_url: "http://localhost:54324".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the store (and optionally the providers) at a mock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: "test-service-role-key".to_string(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            payment_webhook_secret: self.payment_webhook_secret.clone(),
            video_api_base_url: self.video_api_base_url.clone(),
            video_api_token: "test-video-token".to_string(),
            email_api_base_url: self.email_api_base_url.clone(),
            email_api_token: "test-email-token".to_string(),
            email_from: "HealthMate <notifications@healthmate.test>".to_string(),
            sms_api_base_url: self.sms_api_base_url.clone(),
            sms_api_token: "test-sms-token".to_string(),
            sms_from: "+15550006789".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub hospital_id: Option<i64>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
            hospital_id: None,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            hospital_id: None,
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn sub_admin(email: &str, hospital_id: i64) -> Self {
        Self {
            hospital_id: Some(hospital_id),
            ..Self::new(email, "sub-admin")
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            hospital_id: self.hospital_id,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "hospital_id": user.hospital_id,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn hospital_response(id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "contact_email": "front-desk@hospital.example",
            "contact_phone": "+2348000000001",
            "address": "1 Hospital Road",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_response(id: i64, hospital_id: i64, actor_id: &str, full_name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "actor_id": actor_id,
            "hospital_id": hospital_id,
            "full_name": full_name,
            "specialization": "General Practice",
            "fee": 500_00,
            "available": true,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: i64,
        doctor_id: i64,
        hospital_id: i64,
        status: &str,
        payment_ref: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_email": "patient@example.com",
            "hospital_id": hospital_id,
            "doctor_id": doctor_id,
            "date": "2030-06-20",
            "time_slot": "09:00-09:30",
            "status": status,
            "payment_ref": payment_ref,
            "amount_paid": null,
            "video_room_id": null,
            "note": null,
            "approved_at": null,
            "approved_by": null,
            "completed_at": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
