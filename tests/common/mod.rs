//! Shared fixtures: a scripted provider and snapshot builders.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use nba_live_cache::api::StatsProvider;
use nba_live_cache::db::DocumentStore;
use nba_live_cache::error::FetchError;
use nba_live_cache::models::{
    BoxScoreSnapshot, GameStatus, GameSummary, PlayByPlaySnapshot, PlayEvent, PlayerLine,
    ScoreboardSnapshot, StaticBoxScoreSnapshot, TeamLine,
};

/// Provider answering from in-memory scripts.
///
/// Unknown ids answer `UnknownGame`, ids marked failing answer `Transient`,
/// and a missing scoreboard answers `Transient`.
#[derive(Default)]
pub struct ScriptedProvider {
    scoreboard: Mutex<Option<ScoreboardSnapshot>>,
    box_scores: Mutex<HashMap<String, BoxScoreSnapshot>>,
    static_box_scores: Mutex<HashMap<String, StaticBoxScoreSnapshot>>,
    plays: Mutex<HashMap<String, PlayByPlaySnapshot>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scoreboard(&self, board: Option<ScoreboardSnapshot>) {
        *self.scoreboard.lock().unwrap() = board;
    }

    /// Script a game with `players` player lines and `plays` actions
    pub fn add_game(&self, game_id: &str, players: usize, plays: u32) {
        self.box_scores
            .lock()
            .unwrap()
            .insert(game_id.to_string(), box_score(game_id, players));
        self.plays
            .lock()
            .unwrap()
            .insert(game_id.to_string(), play_by_play(game_id, plays));
    }

    pub fn add_static_game(&self, game_id: &str, players: usize) {
        let live = box_score(game_id, players);
        self.static_box_scores.lock().unwrap().insert(
            game_id.to_string(),
            StaticBoxScoreSnapshot {
                game_id: game_id.to_string(),
                player_stats: live.player_stats,
                team_stats: live.team_stats,
                retrieved_at: Utc::now(),
            },
        );
    }

    pub fn fail_game(&self, game_id: &str) {
        self.failing.lock().unwrap().insert(game_id.to_string());
    }

    pub fn recover_game(&self, game_id: &str) {
        self.failing.lock().unwrap().remove(game_id);
    }

    /// Number of provider calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T: Clone>(
        &self,
        scripts: &Mutex<HashMap<String, T>>,
        game_id: &str,
    ) -> Result<T, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(game_id) {
            return Err(FetchError::Transient(format!("{} timed out", game_id)));
        }
        scripts
            .lock()
            .unwrap()
            .get(game_id)
            .cloned()
            .ok_or_else(|| FetchError::UnknownGame(game_id.to_string()))
    }
}

#[async_trait]
impl StatsProvider for ScriptedProvider {
    async fn scoreboard(&self) -> Result<ScoreboardSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scoreboard
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FetchError::Transient("scoreboard unreachable".to_string()))
    }

    async fn box_score(&self, game_id: &str) -> Result<BoxScoreSnapshot, FetchError> {
        self.answer(&self.box_scores, game_id)
    }

    async fn play_by_play(&self, game_id: &str) -> Result<PlayByPlaySnapshot, FetchError> {
        self.answer(&self.plays, game_id)
    }

    async fn static_box_score(&self, game_id: &str) -> Result<StaticBoxScoreSnapshot, FetchError> {
        self.answer(&self.static_box_scores, game_id)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub async fn memory_store() -> DocumentStore {
    DocumentStore::new("sqlite::memory:")
        .await
        .expect("in-memory store")
}

pub fn box_score(game_id: &str, players: usize) -> BoxScoreSnapshot {
    let team = |abbr: &str| TeamLine {
        team_abbreviation: abbr.to_string(),
        ..Default::default()
    };

    BoxScoreSnapshot {
        game_id: game_id.to_string(),
        game_status: "Q2 6:40".to_string(),
        arena: None,
        player_stats: (0..players)
            .map(|n| PlayerLine {
                team_abbreviation: if n % 2 == 0 { "BOS" } else { "NYK" }.to_string(),
                player_name: format!("Player {}", n),
                points: n as u32,
                ..Default::default()
            })
            .collect(),
        team_stats: vec![team("BOS"), team("NYK")],
        retrieved_at: Utc::now(),
    }
}

pub fn play_by_play(game_id: &str, plays: u32) -> PlayByPlaySnapshot {
    PlayByPlaySnapshot {
        game_id: game_id.to_string(),
        plays: (1..=plays)
            .map(|n| PlayEvent {
                action_number: n,
                period: 1 + (n - 1) / 100,
                clock: "PT10M00.00S".to_string(),
                description: format!("action {}", n),
                ..Default::default()
            })
            .collect(),
        retrieved_at: Utc::now(),
    }
}

pub fn scoreboard(date: NaiveDate, games: &[(&str, GameStatus)]) -> ScoreboardSnapshot {
    ScoreboardSnapshot {
        game_date: date,
        games: games
            .iter()
            .map(|(id, status)| GameSummary::new(*id, *status))
            .collect(),
        retrieved_at: Utc::now(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
