// libs/notification-cell/src/services/dispatcher.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{Notification, NotificationError};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Email via a Resend-style JSON API, optional SMS via a Twilio-style API.
/// Delivery is best-effort: callers must never treat a dispatch failure as
/// a booking failure.
#[derive(Debug)]
pub struct HttpDispatcher {
    client: Client,
    email_base_url: String,
    email_token: String,
    email_from: String,
    sms_base_url: String,
    sms_token: String,
    sms_from: String,
    sms_configured: bool,
}

impl HttpDispatcher {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_email_configured() {
            return Err(NotificationError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::EmailFailed(e.to_string()))?;

        Ok(Self {
            client,
            email_base_url: config.email_api_base_url.clone(),
            email_token: config.email_api_token.clone(),
            email_from: config.email_from.clone(),
            sms_base_url: config.sms_api_base_url.clone(),
            sms_token: config.sms_api_token.clone(),
            sms_from: config.sms_from.clone(),
            sms_configured: config.is_sms_configured(),
        })
    }

    async fn send_email(&self, notification: &Notification) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.email_base_url);
        debug!("Sending email to {} via {}", notification.to_email, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.email_token))
            .json(&json!({
                "from": self.email_from,
                "to": notification.to_email,
                "subject": notification.template.subject(),
                "html": notification.template.html_body(),
            }))
            .send()
            .await
            .map_err(|e| NotificationError::EmailFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::EmailFailed(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }

    async fn send_sms(&self, to_phone: &str, notification: &Notification) -> Result<(), NotificationError> {
        let url = format!("{}/Messages", self.sms_base_url);
        debug!("Sending SMS to {} via {}", to_phone, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.sms_token))
            .json(&json!({
                "To": to_phone,
                "From": self.sms_from,
                "Body": notification.template.sms_body(),
            }))
            .send()
            .await
            .map_err(|e| NotificationError::SmsFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::SmsFailed(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for HttpDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.send_email(notification).await?;

        // SMS is optional on both sides: recipient phone and provider config
        if let Some(phone) = &notification.to_phone {
            if self.sms_configured {
                self.send_sms(phone, notification).await?;
            } else {
                warn!("SMS provider not configured, skipping SMS to {}", phone);
            }
        }

        info!("Notification dispatched to {}", notification.to_email);
        Ok(())
    }
}
