//! HTTP API: read-through game data, the live game list and the assistant.

pub mod error;

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assistant::{Assistant, AssistantRequest};
use crate::cache::ReadThrough;
use crate::models::{
    BoxScoreSnapshot, LiveGameSet, PlayByPlaySnapshot, ScoreboardSnapshot,
    StaticBoxScoreSnapshot,
};

pub use error::ApiError;
use error::found;

/// Shared state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub read_through: ReadThrough,
    pub live_games: LiveGameSet,
    pub assistant: Assistant,
}

impl AppState {
    pub fn new(read_through: ReadThrough, live_games: LiveGameSet, assistant: Assistant) -> Self {
        Self {
            read_through,
            live_games,
            assistant,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/scoreboard", get(scoreboard_handler))
        .route("/api/v1/scoreboard/{date}", get(scoreboard_by_date_handler))
        .route("/api/v1/live-games", get(live_games_handler))
        .route("/api/v1/boxscore/{game_id}", get(box_score_handler))
        .route("/api/v1/boxscore/{game_id}/static", get(static_box_score_handler))
        .route("/api/v1/play-by-play/{game_id}", get(play_by_play_handler))
        .route("/api/v1/assistant", post(assistant_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, router(state))
        .await
        .context("HTTP server error")
}

// -- Route Handlers --

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let connected = state.read_through.store().ping().await;
    let live_games = state.live_games.len().await;
    Json(json!({
        "status": if connected { "ok" } else { "degraded" },
        "database": if connected { "connected" } else { "disconnected" },
        "liveGames": live_games,
    }))
}

async fn scoreboard_handler(
    State(state): State<AppState>,
) -> Result<Json<ScoreboardSnapshot>, ApiError> {
    found(state.read_through.scoreboard().await, "Scoreboard").map(Json)
}

async fn scoreboard_by_date_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ScoreboardSnapshot>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date))
    })?;

    found(state.read_through.scoreboard_on(date).await, "Scoreboard").map(Json)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveGamesResponse {
    game_ids: Vec<String>,
}

async fn live_games_handler(State(state): State<AppState>) -> Json<LiveGamesResponse> {
    Json(LiveGamesResponse {
        game_ids: state.live_games.snapshot().await,
    })
}

async fn box_score_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<BoxScoreSnapshot>, ApiError> {
    found(state.read_through.box_score(&game_id).await, "Box score").map(Json)
}

async fn static_box_score_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<StaticBoxScoreSnapshot>, ApiError> {
    found(state.read_through.static_box_score(&game_id).await, "Static box score").map(Json)
}

#[derive(Debug, Deserialize)]
struct PlayByPlayQuery {
    limit: Option<usize>,
}

async fn play_by_play_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    query: Result<Query<PlayByPlayQuery>, QueryRejection>,
) -> Result<Json<PlayByPlaySnapshot>, ApiError> {
    let Query(query) = query?;
    if query.limit == Some(0) {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }

    found(
        state.read_through.play_by_play(&game_id, query.limit).await,
        "Play-by-play",
    )
    .map(Json)
}

async fn assistant_handler(
    State(state): State<AppState>,
    request: Result<Json<AssistantRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = request?;
    let response = state.assistant.respond(&request).await?;
    Ok(Json(json!({ "response": response })))
}
