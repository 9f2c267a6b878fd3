use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AppointmentError, CreateAppointmentRequest, RescheduleAppointmentRequest,
};
use appointment_cell::services::booking::AppointmentBookingService;
use shared_models::slots::Chair;
use shared_utils::test_utils::{MockPostgrestRows, TestConfig};

const FRIDAY: &str = "2025-03-14";

fn create_request(time: &str, email: &str, chair: Option<Chair>) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        date: FRIDAY.to_string(),
        time: time.to_string(),
        name: "Ana".to_string(),
        email: email.to_string(),
        chair,
        notes: None,
    }
}

async fn mount_no_blocked_days(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn mount_day_appointments(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("date", format!("eq.{}", FRIDAY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

fn service_for(postgrest: &MockServer, mail: Option<&MockServer>) -> AppointmentBookingService {
    let config = TestConfig {
        postgrest_url: postgrest.uri(),
        mail_relay_url: mail.map(|m| m.uri()).unwrap_or_default(),
        ..TestConfig::default()
    }
    .to_app_config();
    AppointmentBookingService::new(&config)
}

#[tokio::test]
async fn create_rejects_taken_chair() {
    let server = MockServer::start().await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(
        &server,
        json!([MockPostgrestRows::appointment(
            Uuid::new_v4(),
            FRIDAY,
            "15:15",
            "Luis",
            "luis@test.com",
            Some("Rojo"),
            "pendiente",
        )]),
    )
    .await;

    let service = service_for(&server, None);
    let result = service
        .create_appointment(create_request("15:15", "ana@test.com", Some(Chair::Rojo)))
        .await;

    assert_matches!(result, Err(AppointmentError::ChairTaken(Chair::Rojo)));
}

#[tokio::test]
async fn create_rejects_second_appointment_for_same_email_on_day() {
    let server = MockServer::start().await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(
        &server,
        json!([MockPostgrestRows::appointment(
            Uuid::new_v4(),
            FRIDAY,
            "15:15",
            "Ana",
            "ANA@test.com",
            Some("Rojo"),
            "confirmada",
        )]),
    )
    .await;

    let service = service_for(&server, None);
    let result = service
        .create_appointment(create_request("16:35", "ana@test.com", Some(Chair::Azul)))
        .await;

    assert_matches!(result, Err(AppointmentError::EmailTakenForDay));
}

#[tokio::test]
async fn create_rejects_blocked_date_before_touching_appointments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .and(query_param("date", format!("eq.{}", FRIDAY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::blocked_day(Uuid::new_v4(), FRIDAY, "Festivo")
        ])))
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    let service = service_for(&server, Some(&mail));
    let result = service
        .create_appointment(create_request("15:15", "ana@test.com", Some(Chair::Rojo)))
        .await;

    assert_matches!(result, Err(AppointmentError::DayBlocked));
    assert!(mail.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_persists_and_sends_confirmation() {
    let server = MockServer::start().await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(&server, json!([])).await;

    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestRows::appointment(
                id,
                FRIDAY,
                "15:15",
                "Ana",
                "ana@test.com",
                Some("Rojo"),
                "pendiente",
            )
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({ "to": "ana@test.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mail)
        .await;

    let service = service_for(&server, Some(&mail));
    let (appointment, email_sent) = service
        .create_appointment(create_request("15:15", "ana@test.com", Some(Chair::Rojo)))
        .await
        .unwrap();

    assert_eq!(appointment.id, id);
    assert_eq!(appointment.chair, Some(Chair::Rojo));
    assert!(email_sent);
}

#[tokio::test]
async fn create_succeeds_when_mail_relay_is_down() {
    let server = MockServer::start().await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestRows::appointment(
                Uuid::new_v4(),
                FRIDAY,
                "15:15",
                "Ana",
                "ana@test.com",
                None,
                "pendiente",
            )
        ])))
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mail)
        .await;

    let service = service_for(&server, Some(&mail));
    let (_, email_sent) = service
        .create_appointment(create_request("15:15", "ana@test.com", None))
        .await
        .unwrap();

    assert!(!email_sent);
}

#[tokio::test]
async fn create_maps_storage_conflict_to_conflict_error() {
    // Two requests race past the pre-checks; the unique index wins.
    let server = MockServer::start().await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let service = service_for(&server, None);
    let result = service
        .create_appointment(create_request("15:15", "ana@test.com", Some(Chair::Rojo)))
        .await;

    assert_matches!(result, Err(AppointmentError::Conflict));
}

#[tokio::test]
async fn delete_of_missing_appointment_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    let service = service_for(&server, Some(&mail));
    let result = service.delete_appointment(Uuid::new_v4(), None).await;

    assert_matches!(result, Err(AppointmentError::NotFound));
    assert!(mail.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_sends_cancellation_with_reason() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::appointment(
                id,
                FRIDAY,
                "15:15",
                "Ana",
                "ana@test.com",
                Some("Rojo"),
                "confirmada",
            )
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({ "to": "ana@test.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mail)
        .await;

    let service = service_for(&server, Some(&mail));
    let email_sent = service
        .delete_appointment(id, Some("Enfermedad".to_string()))
        .await
        .unwrap();

    assert!(email_sent);
    let requests = mail.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["text"].as_str().unwrap().contains("Enfermedad"));
}

#[tokio::test]
async fn reschedule_rechecks_target_slot_excluding_itself() {
    // Moving an appointment within the same day must not collide with its
    // own current slot.
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let row = MockPostgrestRows::appointment(
        id,
        FRIDAY,
        "15:15",
        "Ana",
        "ana@test.com",
        Some("Rojo"),
        "confirmada",
    );

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .mount(&server)
        .await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(&server, json!([row])).await;

    let moved = MockPostgrestRows::appointment(
        id,
        FRIDAY,
        "16:35",
        "Ana",
        "ana@test.com",
        Some("Azul"),
        "confirmada",
    );
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([moved])))
        .expect(1)
        .mount(&server)
        .await;

    let mail = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mail)
        .await;

    let service = service_for(&server, Some(&mail));
    let (updated, email_sent) = service
        .reschedule_appointment(
            id,
            RescheduleAppointmentRequest {
                date: FRIDAY.to_string(),
                time: "16:35".to_string(),
                chair: Chair::Azul,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.chair, Some(Chair::Azul));
    assert!(email_sent);
}

#[tokio::test]
async fn reschedule_rejects_chair_held_by_someone_else() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::appointment(
                id,
                FRIDAY,
                "15:15",
                "Ana",
                "ana@test.com",
                Some("Rojo"),
                "confirmada",
            )
        ])))
        .mount(&server)
        .await;
    mount_no_blocked_days(&server).await;
    mount_day_appointments(
        &server,
        json!([MockPostgrestRows::appointment(
            Uuid::new_v4(),
            FRIDAY,
            "16:35",
            "Luis",
            "luis@test.com",
            Some("Azul"),
            "pendiente",
        )]),
    )
    .await;

    let service = service_for(&server, None);
    let result = service
        .reschedule_appointment(
            id,
            RescheduleAppointmentRequest {
                date: FRIDAY.to_string(),
                time: "16:35".to_string(),
                chair: Chair::Azul,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::ChairTaken(Chair::Azul)));
}

#[tokio::test]
async fn create_validation_rejects_bad_input_without_store_calls() {
    let server = MockServer::start().await;
    let service = service_for(&server, None);

    let mut missing = create_request("15:15", "ana@test.com", None);
    missing.name = "   ".to_string();
    assert_matches!(
        service.create_appointment(missing).await,
        Err(AppointmentError::MissingFields)
    );

    let mut bad_date = create_request("15:15", "ana@test.com", None);
    bad_date.date = "14/03/2025".to_string();
    assert_matches!(
        service.create_appointment(bad_date).await,
        Err(AppointmentError::InvalidDate)
    );

    let mut bad_time = create_request("15:15", "ana@test.com", None);
    bad_time.time = "late".to_string();
    assert_matches!(
        service.create_appointment(bad_time).await,
        Err(AppointmentError::InvalidTime)
    );

    let bad_email = create_request("15:15", "not-an-email", None);
    assert_matches!(
        service.create_appointment(bad_email).await,
        Err(AppointmentError::InvalidEmail)
    );

    assert!(server.received_requests().await.unwrap().is_empty());
}
