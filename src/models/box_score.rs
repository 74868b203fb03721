use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arena the game is played in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arena {
    pub arena_id: i64,
    pub arena_name: String,
    pub arena_city: String,
    pub arena_state: Option<String>,
    pub arena_country: Option<String>,
}

/// Flat per-player statistics line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLine {
    /// Tricode of the team the player belongs to
    pub team_abbreviation: String,
    pub player_name: String,
    /// Empty for bench players
    pub start_position: String,
    /// Provider minutes text, e.g. "PT24M" or "34:12"
    pub minutes: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub field_goals_percentage: f64,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub three_pointers_percentage: f64,
}

/// Team totals as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
    pub points: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub field_goals_percentage: f64,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub three_pointers_percentage: f64,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub free_throws_percentage: f64,
    pub rebounds_offensive: u32,
    pub rebounds_defensive: u32,
    pub rebounds_total: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls_personal: u32,
}

/// Team statistics with denormalized identity fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLine {
    pub team_id: i64,
    pub team_city: String,
    pub team_name: String,
    pub team_abbreviation: String,
    pub team_score: u32,
    pub statistics: TeamStatistics,
}

/// Live box score, one document per game replaced on every refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxScoreSnapshot {
    pub game_id: String,
    /// Provider status text, e.g. "Q3 5:12" or "Final"
    pub game_status: String,
    pub arena: Option<Arena>,
    pub player_stats: Vec<PlayerLine>,
    /// Home team first, away team second
    pub team_stats: Vec<TeamLine>,
    pub retrieved_at: DateTime<Utc>,
}

impl BoxScoreSnapshot {
    pub fn home_team(&self) -> Option<&TeamLine> {
        self.team_stats.first()
    }

    pub fn away_team(&self) -> Option<&TeamLine> {
        self.team_stats.get(1)
    }
}

/// Players of one team, highest scorers first
pub fn team_players<'a>(players: &'a [PlayerLine], team_abbreviation: &str) -> Vec<&'a PlayerLine> {
    let mut team: Vec<&PlayerLine> = players
        .iter()
        .filter(|p| p.team_abbreviation == team_abbreviation)
        .collect();
    team.sort_by(|a, b| b.points.cmp(&a.points));
    team
}

/// Post-game box score from the stats API, kept apart from the live one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticBoxScoreSnapshot {
    pub game_id: String,
    pub player_stats: Vec<PlayerLine>,
    pub team_stats: Vec<TeamLine>,
    pub retrieved_at: DateTime<Utc>,
}
