use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use blocked_day_cell::models::{BlockDayRequest, BlockedDayError, DEFAULT_BLOCK_REASON};
use blocked_day_cell::services::registry::BlockedDayRegistry;
use shared_utils::test_utils::{MockPostgrestRows, TestConfig};

const FRIDAY: &str = "2025-03-14";
const SATURDAY: &str = "2025-03-15";

fn registry_for(server: &MockServer) -> BlockedDayRegistry {
    BlockedDayRegistry::new(&TestConfig::with_postgrest_url(&server.uri()).to_app_config())
}

fn block_request(date: &str, reason: Option<&str>) -> BlockDayRequest {
    BlockDayRequest {
        date: date.to_string(),
        reason: reason.map(str::to_string),
    }
}

#[tokio::test]
async fn block_rejects_non_friday_without_store_calls() {
    let server = MockServer::start().await;
    let registry = registry_for(&server);

    let result = registry.block(block_request(SATURDAY, None)).await;

    assert_matches!(result, Err(BlockedDayError::NotFriday));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn block_rejects_missing_and_malformed_dates() {
    let server = MockServer::start().await;
    let registry = registry_for(&server);

    assert_matches!(
        registry.block(block_request("  ", None)).await,
        Err(BlockedDayError::MissingDate)
    );
    assert_matches!(
        registry.block(block_request("14/03/2025", None)).await,
        Err(BlockedDayError::InvalidDate)
    );
}

#[tokio::test]
async fn block_rejects_already_blocked_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .and(query_param("date", format!("eq.{}", FRIDAY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::blocked_day(Uuid::new_v4(), FRIDAY, "Festivo")
        ])))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let result = registry.block(block_request(FRIDAY, None)).await;

    assert_matches!(result, Err(BlockedDayError::AlreadyBlocked));
}

#[tokio::test]
async fn block_fills_in_default_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/rest/v1/blocked_days"))
        .and(body_partial_json(json!({ "reason": DEFAULT_BLOCK_REASON })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPostgrestRows::blocked_day(id, FRIDAY, DEFAULT_BLOCK_REASON)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let blocked = registry.block(block_request(FRIDAY, Some("  "))).await.unwrap();

    assert_eq!(blocked.id, id);
    assert_eq!(blocked.reason, DEFAULT_BLOCK_REASON);
}

#[tokio::test]
async fn concurrent_block_surfaces_as_already_blocked() {
    // Pre-check passes but the unique index on date rejects the insert.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let result = registry.block(block_request(FRIDAY, Some("Festivo"))).await;

    assert_matches!(result, Err(BlockedDayError::AlreadyBlocked));
}

#[tokio::test]
async fn unblock_of_missing_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let result = registry.unblock(Uuid::new_v4()).await;

    assert_matches!(result, Err(BlockedDayError::NotFound));
}

#[tokio::test]
async fn unblock_deletes_the_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::blocked_day(id, FRIDAY, "Festivo")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/blocked_days"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    registry.unblock(id).await.unwrap();
}

#[tokio::test]
async fn is_blocked_reflects_store_contents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .and(query_param("date", format!("eq.{}", FRIDAY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPostgrestRows::blocked_day(Uuid::new_v4(), FRIDAY, "Festivo")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let friday = NaiveDate::parse_from_str(FRIDAY, "%Y-%m-%d").unwrap();
    let other = NaiveDate::parse_from_str("2025-03-21", "%Y-%m-%d").unwrap();

    assert!(registry.is_blocked(friday).await.unwrap());
    assert!(!registry.is_blocked(other).await.unwrap());
}
