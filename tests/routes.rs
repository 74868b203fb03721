//! HTTP routes exercised in-process through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use nba_live_cache::api::GeminiClient;
use nba_live_cache::assistant::Assistant;
use nba_live_cache::cache::ReadThrough;
use nba_live_cache::models::{GameStatus, LiveGameSet};
use nba_live_cache::server::{router, AppState};

use common::{date, memory_store, scoreboard, ScriptedProvider};

async fn app(
    provider: Arc<ScriptedProvider>,
    gemini: Option<GeminiClient>,
) -> (Router, LiveGameSet) {
    let store = memory_store().await;
    let live = LiveGameSet::new();
    let state = AppState::new(
        ReadThrough::new(provider, store.clone()),
        live.clone(),
        Assistant::new(gemini, store, live.clone()),
    );
    (router(state), live)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ──────────────────────────────────────────
// Health and live games
// ──────────────────────────────────────────

#[tokio::test]
async fn health_reports_store_and_live_count() {
    let (app, live) = app(Arc::new(ScriptedProvider::new()), None).await;
    live.replace(vec!["A".into(), "B".into()]).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": "connected", "liveGames": 2}));
}

#[tokio::test]
async fn live_games_lists_tracked_ids() {
    let (app, live) = app(Arc::new(ScriptedProvider::new()), None).await;
    live.replace(vec!["0022300001".into()]).await;

    let (status, body) = get(&app, "/api/v1/live-games").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"gameIds": ["0022300001"]}));
}

// ──────────────────────────────────────────
// Game data
// ──────────────────────────────────────────

#[tokio::test]
async fn box_score_status_codes() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.add_game("0022300001", 4, 4);
    provider.add_game("0022300002", 4, 4);
    provider.fail_game("0022300002");
    let (app, _) = app(provider, None).await;

    let (status, body) = get(&app, "/api/v1/boxscore/0022300001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameId"], "0022300001");
    assert_eq!(body["playerStats"].as_array().unwrap().len(), 4);

    let (status, body) = get(&app, "/api/v1/boxscore/0029999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Box score not found"}));

    let (status, body) = get(&app, "/api/v1/boxscore/0022300002").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().starts_with("Box score unavailable"));
}

#[tokio::test]
async fn static_box_score_route() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.add_static_game("0022000181", 3);
    let (app, _) = app(provider, None).await;

    let (status, body) = get(&app, "/api/v1/boxscore/0022000181/static").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameId"], "0022000181");
}

#[tokio::test]
async fn play_by_play_limit_query() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.add_game("0022300001", 1, 40);
    let (app, _) = app(provider, None).await;

    let (status, body) = get(&app, "/api/v1/play-by-play/0022300001?limit=5").await;
    assert_eq!(status, StatusCode::OK);
    let plays = body["plays"].as_array().unwrap();
    assert_eq!(plays.len(), 5);
    assert_eq!(plays[0]["actionNumber"], 36);

    let (_, body) = get(&app, "/api/v1/play-by-play/0022300001").await;
    assert_eq!(body["plays"].as_array().unwrap().len(), 40);

    let (status, _) = get(&app, "/api/v1/play-by-play/0022300001?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_limit_gets_json_error() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.add_game("0022300001", 1, 40);
    let (app, _) = app(provider.clone(), None).await;

    for uri in [
        "/api/v1/play-by-play/0022300001?limit=abc",
        "/api/v1/play-by-play/0022300001?limit=-1",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn scoreboard_routes() {
    let provider = Arc::new(ScriptedProvider::new());
    let (app, _) = app(provider.clone(), None).await;

    let (status, _) = get(&app, "/api/v1/scoreboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    provider.set_scoreboard(Some(scoreboard(date(2024, 1, 15), &[("A", GameStatus::Live)])));
    let (status, body) = get(&app, "/api/v1/scoreboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameDate"], "2024-01-15");
    assert_eq!(body["games"][0]["gameStatus"], 2);

    let (status, body) = get(&app, "/api/v1/scoreboard/2024-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games"][0]["gameId"], "A");

    let (status, _) = get(&app, "/api/v1/scoreboard/2024-01-14").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/v1/scoreboard/yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ──────────────────────────────────────────
// Assistant
// ──────────────────────────────────────────

#[tokio::test]
async fn assistant_rejects_empty_prompt() {
    let (app, _) = app(Arc::new(ScriptedProvider::new()), None).await;

    let (status, body) = post_json(&app, "/api/v1/assistant", json!({"prompt": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "prompt is required"}));
}

#[tokio::test]
async fn assistant_malformed_body_gets_json_error() {
    let (app, _) = app(Arc::new(ScriptedProvider::new()), None).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/assistant")
        .header("content-type", "application/json")
        .body(Body::from("{\"prompt\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = post_json(&app, "/api/v1/assistant", json!({"prompt": 42})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn assistant_without_key_is_unavailable() {
    let (app, _) = app(Arc::new(ScriptedProvider::new()), None).await;

    let (status, _) = post_json(&app, "/api/v1/assistant", json!({"prompt": "Who leads?"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn assistant_relays_model_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Boston by 4."}]}}]
        })))
        .mount(&server)
        .await;
    let gemini = GeminiClient::new("test-key", "gemini-1.5-flash")
        .unwrap()
        .with_base_url(&server.uri());

    let (app, _) = app(Arc::new(ScriptedProvider::new()), Some(gemini)).await;
    let (status, body) = post_json(
        &app,
        "/api/v1/assistant",
        json!({
            "prompt": "Who is winning?",
            "history": [{"role": "user", "text": "hi"}, {"role": "model", "text": "hello"}],
            "gameId": "0022300001"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Boston by 4."}));

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["contents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn assistant_model_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let gemini = GeminiClient::new("test-key", "gemini-1.5-flash")
        .unwrap()
        .with_base_url(&server.uri());

    let (app, _) = app(Arc::new(ScriptedProvider::new()), Some(gemini)).await;
    let (status, _) = post_json(&app, "/api/v1/assistant", json!({"prompt": "Who leads?"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
