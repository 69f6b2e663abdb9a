use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assert_matches::assert_matches;
use shared_config::AppConfig;
use video_room_cell::{VideoRoomClient, VideoRoomError};

fn config_for(base_url: &str, token: &str) -> AppConfig {
    AppConfig {
        supabase_url: String::new(),
        supabase_anon_key: String::new(),
        supabase_service_role_key: String::new(),
        supabase_jwt_secret: String::new(),
        payment_webhook_secret: String::new(),
        video_api_base_url: base_url.to_string(),
        video_api_token: token.to_string(),
        email_api_base_url: String::new(),
        email_api_token: String::new(),
        email_from: String::new(),
        sms_api_base_url: String::new(),
        sms_api_token: String::new(),
        sms_from: String::new(),
    }
}

#[tokio::test]
async fn creates_a_room_by_unique_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Rooms"))
        .and(header("Authorization", "Bearer test-video-token"))
        .and(body_partial_json(json!({
            "unique_name": "consult_42",
            "max_participants": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sid": "RM42",
            "unique_name": "consult_42"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VideoRoomClient::new(&config_for(&mock_server.uri(), "test-video-token")).unwrap();

    let room = client.create_room("consult_42").await.expect("room created");
    assert_eq!(room.sid, "RM42");
    assert_eq!(room.unique_name, "consult_42");
}

#[tokio::test]
async fn provider_5xx_is_classified_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Rooms"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = VideoRoomClient::new(&config_for(&mock_server.uri(), "t")).unwrap();

    let err = client.create_room("consult_42").await.unwrap_err();
    assert_matches!(err, VideoRoomError::ProviderError { status: 503, .. });
    assert!(err.is_retryable());
}

#[tokio::test]
async fn provider_4xx_is_not_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Rooms"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad room name"))
        .mount(&mock_server)
        .await;

    let client = VideoRoomClient::new(&config_for(&mock_server.uri(), "t")).unwrap();

    let err = client.create_room("consult_42").await.unwrap_err();
    assert!(!err.is_retryable());
}

#[test]
fn missing_configuration_is_rejected_up_front() {
    let result = VideoRoomClient::new(&config_for("", ""));
    assert_matches!(result, Err(VideoRoomError::NotConfigured));
}
