use axum::extract::{Extension, Path, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers;
use appointment_cell::models::CompleteAppointmentRequest;
use assert_matches::assert_matches;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn create_auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").unwrap())
}

fn approved_appointment(id: i64, doctor_id: i64) -> serde_json::Value {
    let mut row = MockSupabaseResponses::appointment_response(id, doctor_id, 1, "approved", "apt-100");
    row["video_room_id"] = json!("RM123");
    row
}

async fn mock_doctor_for_actor(mock_server: &MockServer, actor_id: &str, doctor_id: i64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("actor_id", format!("eq.{}", actor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, 1, actor_id, "Bello")
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn owning_doctor_completes_an_approved_appointment() {
    let mock_server = MockServer::start().await;
    let doctor_user = TestUser::doctor("bello@hospital.example");

    mock_doctor_for_actor(&mock_server, &doctor_user.id, 7).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([approved_appointment(5, 7)])),
        )
        .mount(&mock_server)
        .await;

    let mut completed = approved_appointment(5, 7);
    completed["status"] = json!("completed");
    completed["note"] = json!("Follow up in two weeks");
    completed["completed_at"] = json!("2030-06-20T10:00:00Z");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.5"))
        .and(query_param("doctor_id", "eq.7"))
        .and(query_param("status", "eq.approved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([completed])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let response = handlers::complete_appointment(
        State(state),
        Path(5),
        create_auth_header(),
        Extension(doctor_user.to_user()),
        Json(CompleteAppointmentRequest {
            note: Some("Follow up in two weeks".to_string()),
        }),
    )
    .await
    .expect("completion should succeed");

    assert_eq!(response.0["success"], json!(true));
}

#[tokio::test]
async fn completing_someone_elses_appointment_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let doctor_user = TestUser::doctor("other@hospital.example");

    // The caller resolves to doctor 8; the appointment belongs to doctor 7.
    mock_doctor_for_actor(&mock_server, &doctor_user.id, 8).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([approved_appointment(5, 7)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::complete_appointment(
        State(state),
        Path(5),
        create_auth_header(),
        Extension(doctor_user.to_user()),
        Json(CompleteAppointmentRequest { note: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn completing_a_paid_appointment_is_a_state_conflict() {
    let mock_server = MockServer::start().await;
    let doctor_user = TestUser::doctor("bello@hospital.example");

    mock_doctor_for_actor(&mock_server, &doctor_user.id, 7).await;

    let paid = MockSupabaseResponses::appointment_response(5, 7, 1, "paid", "apt-100");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([paid])))
        .mount(&mock_server)
        .await;

    // The lifecycle check rejects paid -> completed before any update.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::complete_appointment(
        State(state),
        Path(5),
        create_auth_header(),
        Extension(doctor_user.to_user()),
        Json(CompleteAppointmentRequest { note: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn unknown_actor_cannot_complete_anything() {
    let mock_server = MockServer::start().await;
    let doctor_user = TestUser::doctor("ghost@hospital.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::complete_appointment(
        State(state),
        Path(5),
        create_auth_header(),
        Extension(doctor_user.to_user()),
        Json(CompleteAppointmentRequest { note: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
