//! Tests for the card database client.

use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{CardIdentifier, RateLimiter, YgoProDeckClient};
use crate::error::DeckCheckError;

fn card_json(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "type": "Normal Monster",
        "frameType": "normal",
        "desc": "Test card",
        "race": "Dragon",
        "card_prices": [{ "cardmarket_price": "1.50", "tcgplayer_price": "2.00" }]
    })
}

/// Built inside spawn_blocking: the blocking client must not be created or
/// dropped on an async worker thread.
fn client(uri: &str) -> YgoProDeckClient {
    YgoProDeckClient::new(uri, Duration::ZERO)
}

// ── cards_by_ids ─────────────────────────────────────────────────────

#[tokio::test]
async fn cards_by_ids_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .and(query_param("id", "10,20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [card_json(10, "Ten"), card_json(20, "Twenty")]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).cards_by_ids(&[10, 20]))
        .await
        .unwrap();

    let cards = result.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].name, "Ten");
    assert_eq!(cards[1].id, 20);
}

#[tokio::test]
async fn cards_by_ids_empty_input_skips_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).cards_by_ids(&[]))
        .await
        .unwrap();

    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn cards_by_ids_api_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "No card matching your query was found in the database."
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).cards_by_ids(&[1]))
        .await
        .unwrap();

    match result.unwrap_err() {
        DeckCheckError::ApiResponse { code, details } => {
            assert_eq!(code, "400");
            assert!(details.contains("No card matching"));
        }
        other => panic!("Expected ApiResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn cards_by_ids_http_status_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).cards_by_ids(&[1]))
        .await
        .unwrap();

    match result.unwrap_err() {
        DeckCheckError::HttpStatus(status) => assert_eq!(status.as_u16(), 503),
        other => panic!("Expected HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn error_field_in_success_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "bad query" })),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).card_by_id(5))
        .await
        .unwrap();

    assert!(matches!(result, Err(DeckCheckError::ApiResponse { .. })));
}

// ── name lookups ─────────────────────────────────────────────────────

#[tokio::test]
async fn card_by_name_returns_first_hit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .and(query_param("name", "Dark Magician"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [card_json(46986414, "Dark Magician")]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).card_by_name("Dark Magician"))
        .await
        .unwrap();

    let card = result.unwrap().unwrap();
    assert_eq!(card.id, 46986414);
}

#[tokio::test]
async fn cards_by_names_joins_with_pipe() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .and(query_param("name", "Raigeki|Pot of Greed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [card_json(1, "Raigeki"), card_json(2, "Pot of Greed")]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let names = vec!["Raigeki".to_string(), "Pot of Greed".to_string()];
    let result = tokio::task::spawn_blocking(move || client(&uri).cards_by_names(&names))
        .await
        .unwrap();

    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn search_blank_term_skips_request() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    let result = tokio::task::spawn_blocking(move || client(&uri).search_cards("   "))
        .await
        .unwrap();

    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn card_sets_parses_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardsets.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "set_name": "Legend of Blue Eyes White Dragon", "set_code": "LOB",
              "num_of_cards": 126, "tcg_date": "2002-03-08" }
        ])))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(&uri).card_sets())
        .await
        .unwrap();

    let sets = result.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].set_code, "LOB");
    assert_eq!(sets[0].num_of_cards, 126);
}

// ── validate_cards ───────────────────────────────────────────────────

#[tokio::test]
async fn validate_cards_skips_misses_and_reports_progress() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [card_json(10, "Ten")]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("name", "Nope"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "not found" })),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let mut progress = Vec::new();
        let cards = client(&uri).validate_cards(
            &[CardIdentifier::Id(10), CardIdentifier::Name("Nope".to_string())],
            |done, total| progress.push((done, total)),
        );
        (cards, progress)
    })
    .await
    .unwrap();

    let (cards, progress) = result;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Ten");
    assert_eq!(progress, vec![(1, 2), (2, 2)]);
}

// ── RateLimiter ──────────────────────────────────────────────────────

#[test]
fn rate_limiter_spaces_requests() {
    let limiter = RateLimiter::new(Duration::from_millis(30));
    let start = Instant::now();
    limiter.throttle();
    limiter.throttle();
    limiter.throttle();
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[test]
fn rate_limiter_first_call_does_not_wait() {
    let limiter = RateLimiter::new(Duration::from_secs(5));
    let start = Instant::now();
    limiter.throttle();
    assert!(start.elapsed() < Duration::from_secs(1));
}
