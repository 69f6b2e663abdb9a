// libs/video-room-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomRequest {
    pub unique_name: String,
    pub max_participants: i32,
    pub empty_room_timeout_minutes: i32,
}

/// Provider-assigned room handle. The core stores `sid` opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub sid: String,
    pub unique_name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum VideoRoomError {
    #[error("Video room provider is not configured")]
    NotConfigured,

    #[error("Video room provider timed out")]
    Timeout,

    #[error("Video room provider error (HTTP {status}): {message}")]
    ProviderError { status: u16, message: String },

    #[error("Video room provider transport error: {0}")]
    TransportError(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl VideoRoomError {
    /// Timeouts, transport failures and 5xx responses may be retried
    /// without re-running the state transition that triggered them.
    pub fn is_retryable(&self) -> bool {
        match self {
            VideoRoomError::Timeout | VideoRoomError::TransportError(_) => true,
            VideoRoomError::ProviderError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
