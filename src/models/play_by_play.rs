use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of plays returned when no explicit limit is given
pub const DEFAULT_PLAY_LIMIT: usize = 30;

/// A single play-by-play action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    /// Monotonic per game
    pub action_number: u32,
    pub period: u32,
    /// ISO-8601 duration left in the period, e.g. "PT03M51.00S"
    pub clock: String,
    pub team_tricode: Option<String>,
    pub score_home: u32,
    pub score_away: u32,
    pub description: String,
    pub action_type: String,
    pub person_id: Option<i64>,
    pub team_id: Option<i64>,
    pub player_name: Option<String>,
}

/// Full play list for a game as of the last successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlaySnapshot {
    pub game_id: String,
    /// Chronological order
    pub plays: Vec<PlayEvent>,
    pub retrieved_at: DateTime<Utc>,
}

impl PlayByPlaySnapshot {
    /// Copy holding only the last `limit` plays, order preserved
    pub fn latest(&self, limit: usize) -> PlayByPlaySnapshot {
        let start = self.plays.len().saturating_sub(limit);
        PlayByPlaySnapshot {
            game_id: self.game_id.clone(),
            plays: self.plays[start..].to_vec(),
            retrieved_at: self.retrieved_at,
        }
    }

    pub fn last_play(&self) -> Option<&PlayEvent> {
        self.plays.last()
    }
}
