use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers;
use appointment_cell::models::{CreateAppointmentRequest, DateQuery};
use assert_matches::assert_matches;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn create_auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").unwrap())
}

fn patient_extension(email: &str) -> Extension<User> {
    Extension(TestUser::patient(email).to_user())
}

fn booking_request(date: &str, time_slot: &str) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_email: "patient@example.com".to_string(),
        hospital_id: 1,
        doctor_id: 7,
        date: date.parse().unwrap(),
        time_slot: time_slot.to_string(),
    }
}

async fn mock_doctor(mock_server: &MockServer, doctor: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn booking_creates_a_pending_row_and_returns_the_payment_reference() {
    let mock_server = MockServer::start().await;
    mock_doctor(
        &mock_server,
        MockSupabaseResponses::doctor_response(7, 1, "doc-actor", "Bello"),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response(42, 7, 1, "pending", "apt-123")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let response = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("patient@example.com"),
        Json(booking_request("2030-06-20", "09:00-09:30")),
    )
    .await
    .expect("booking should succeed");

    assert_eq!(response.0["success"], json!(true));
    assert_eq!(response.0["appointment_id"], json!(42));
    assert_eq!(response.0["payment_ref"], json!("apt-123"));
}

#[tokio::test]
async fn unknown_slot_label_is_rejected_before_touching_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("patient@example.com"),
        Json(booking_request("2030-06-20", "16:30-17:00")),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("patient@example.com"),
        Json(booking_request("2020-01-01", "09:00-09:30")),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn doctor_outside_the_requested_hospital_is_rejected() {
    let mock_server = MockServer::start().await;
    mock_doctor(
        &mock_server,
        MockSupabaseResponses::doctor_response(7, 2, "doc-actor", "Bello"),
    )
    .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("patient@example.com"),
        Json(booking_request("2030-06-20", "09:00-09:30")),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn unavailable_doctor_gates_new_bookings() {
    let mock_server = MockServer::start().await;

    let mut doctor = MockSupabaseResponses::doctor_response(7, 1, "doc-actor", "Bello");
    doctor["available"] = json!(false);
    mock_doctor(&mock_server, doctor).await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("patient@example.com"),
        Json(booking_request("2030-06-20", "09:00-09:30")),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn booking_for_someone_else_requires_hospital_staff() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        create_auth_header(),
        patient_extension("other@example.com"),
        Json(booking_request("2030-06-20", "09:00-09:30")),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn busy_slots_reflect_committed_appointments() {
    let mock_server = MockServer::start().await;

    // The ledger asks only for committed statuses; the store answers with
    // their slots.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.7"))
        .and(query_param("date", "eq.2030-06-20"))
        .and(query_param("status", "in.(paid,approved,completed)"))
        .and(query_param("select", "time_slot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time_slot": "09:00-09:30" },
            { "time_slot": "11:00-11:30" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let response = handlers::get_busy_slots(
        State(state),
        Path(7),
        Query(DateQuery {
            date: NaiveDate::parse_from_str("2030-06-20", "%Y-%m-%d").unwrap(),
        }),
    )
    .await
    .expect("slot query should succeed");

    assert_eq!(response.0, vec!["09:00-09:30", "11:00-11:30"]);
}

#[tokio::test]
async fn empty_day_has_no_busy_slots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let response = handlers::get_busy_slots(
        State(state),
        Path(7),
        Query(DateQuery {
            date: NaiveDate::parse_from_str("2030-06-20", "%Y-%m-%d").unwrap(),
        }),
    )
    .await
    .expect("slot query should succeed");

    assert!(response.0.is_empty());
}
