// libs/video-room-cell/src/services/provider.rs
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{CreateRoomRequest, RoomInfo, VideoRoomError};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

/// Client for the external video-room provider. Rooms are provisioned by
/// unique name and the returned SID is stored opaquely on the appointment.
#[derive(Debug)]
pub struct VideoRoomClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl VideoRoomClient {
    pub fn new(config: &AppConfig) -> Result<Self, VideoRoomError> {
        if !config.is_video_configured() {
            return Err(VideoRoomError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| VideoRoomError::TransportError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.video_api_base_url.clone(),
            api_token: config.video_api_token.clone(),
        })
    }

    /// POST {base}/Rooms — create (or fetch) a consultation room.
    ///
    /// Room names are deterministic per appointment, so a retried call after
    /// a timeout re-requests the same room rather than leaking a second one.
    pub async fn create_room(&self, unique_name: &str) -> Result<RoomInfo, VideoRoomError> {
        info!("Provisioning video room {}", unique_name);

        let url = format!("{}/Rooms", self.base_url);

        let request_body = CreateRoomRequest {
            unique_name: unique_name.to_string(),
            max_participants: 2,
            empty_room_timeout_minutes: 30,
        };

        debug!("Sending room creation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VideoRoomError::Timeout
                } else {
                    VideoRoomError::TransportError(e.to_string())
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| VideoRoomError::TransportError(e.to_string()))?;

        if !status.is_success() {
            error!("Room creation failed: {} - {}", status, response_text);
            return Err(VideoRoomError::ProviderError {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let room: RoomInfo = serde_json::from_str(&response_text)
            .map_err(|e| VideoRoomError::InvalidResponse(format!("{}: {}", e, response_text)))?;

        info!("Video room {} provisioned with sid {}", room.unique_name, room.sid);
        Ok(room)
    }
}
