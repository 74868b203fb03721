use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Provider game status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GameStatus {
    /// Not started yet (code 1)
    Scheduled,
    /// In progress (code 2)
    Live,
    /// Finished (code 3)
    Final,
    /// Any code the provider adds later
    Other(u8),
}

impl From<u8> for GameStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => GameStatus::Scheduled,
            2 => GameStatus::Live,
            3 => GameStatus::Final,
            other => GameStatus::Other(other),
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Scheduled => 1,
            GameStatus::Live => 2,
            GameStatus::Final => 3,
            GameStatus::Other(code) => code,
        }
    }
}

/// Team identity and record as shown on the scoreboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_id: i64,
    pub team_name: String,
    pub team_city: String,
    pub team_tricode: String,
    pub score: u32,
    pub wins: u32,
    pub losses: u32,
}

/// One game on the daily scoreboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: String,
    pub game_status: GameStatus,
    #[serde(default)]
    pub game_status_text: String,
    #[serde(default)]
    pub period: u32,
    #[serde(default)]
    pub game_clock: String,
    pub game_time_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub home_team: TeamSummary,
    #[serde(default)]
    pub away_team: TeamSummary,
}

impl GameSummary {
    /// Minimal summary, mostly useful when only id and status matter
    pub fn new(game_id: impl Into<String>, game_status: GameStatus) -> Self {
        Self {
            game_id: game_id.into(),
            game_status,
            game_status_text: String::new(),
            period: 0,
            game_clock: String::new(),
            game_time_utc: None,
            home_team: TeamSummary::default(),
            away_team: TeamSummary::default(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.game_status == GameStatus::Live
    }
}

/// Scoreboard for one provider day, keyed by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardSnapshot {
    pub game_date: NaiveDate,
    pub games: Vec<GameSummary>,
    pub retrieved_at: DateTime<Utc>,
}

impl ScoreboardSnapshot {
    /// Ids of games currently in progress, in scoreboard order
    pub fn live_game_ids(&self) -> Vec<String> {
        self.games
            .iter()
            .filter(|g| g.is_live())
            .map(|g| g.game_id.clone())
            .collect()
    }
}
