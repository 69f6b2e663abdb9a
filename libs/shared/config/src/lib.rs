use std::env;
use tracing::warn;

fn env_or_empty(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", key);
        String::new()
    })
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub payment_webhook_secret: String,
    pub video_api_base_url: String,
    pub video_api_token: String,
    pub email_api_base_url: String,
    pub email_api_token: String,
    pub email_from: String,
    pub sms_api_base_url: String,
    pub sms_api_token: String,
    pub sms_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env_or_empty("SUPABASE_URL"),
            supabase_anon_key: env_or_empty("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_service_role_key: env_or_empty("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_jwt_secret: env_or_empty("SUPABASE_JWT_SECRET"),
            payment_webhook_secret: env_or_empty("PAYMENT_WEBHOOK_SECRET"),
            video_api_base_url: env::var("VIDEO_API_BASE_URL").unwrap_or_else(|_| {
                warn!("VIDEO_API_BASE_URL not set, using default");
                "https://video.twilio.com/v1".to_string()
            }),
            video_api_token: env_or_empty("VIDEO_API_TOKEN"),
            email_api_base_url: env::var("EMAIL_API_BASE_URL").unwrap_or_else(|_| {
                warn!("EMAIL_API_BASE_URL not set, using default");
                "https://api.resend.com".to_string()
            }),
            email_api_token: env_or_empty("EMAIL_API_TOKEN"),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "HealthMate <notifications@healthmate.example>".to_string()),
            sms_api_base_url: env_or_empty("SMS_API_BASE_URL"),
            sms_api_token: env_or_empty("SMS_API_TOKEN"),
            sms_from: env_or_empty("SMS_FROM"),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
            && !self.payment_webhook_secret.is_empty()
    }

    pub fn is_video_configured(&self) -> bool {
        !self.video_api_base_url.is_empty() && !self.video_api_token.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_base_url.is_empty() && !self.email_api_token.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.sms_api_base_url.is_empty() && !self.sms_api_token.is_empty()
    }
}
