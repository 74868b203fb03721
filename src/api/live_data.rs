use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::http::fetch_json;
use crate::error::FetchError;
use crate::models::{
    Arena, BoxScoreSnapshot, GameStatus, GameSummary, PlayByPlaySnapshot, PlayEvent, PlayerLine,
    ScoreboardSnapshot, TeamLine, TeamStatistics, TeamSummary,
};

/// Client for the NBA live data CDN (scoreboard, box score, play-by-play)
#[derive(Clone)]
pub struct LiveDataClient {
    client: Client,
    base_url: String,
}

// ---------------------------------------------------------------------------
// Scoreboard payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScoreboardEnvelope {
    scoreboard: RawScoreboard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoreboard {
    game_date: String,
    games: Vec<RawScoreboardGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoreboardGame {
    game_id: String,
    game_status: u8,
    #[serde(default)]
    game_status_text: String,
    #[serde(default)]
    period: u32,
    #[serde(default)]
    game_clock: String,
    #[serde(rename = "gameTimeUTC")]
    game_time_utc: Option<String>,
    home_team: RawScoreboardTeam,
    away_team: RawScoreboardTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoreboardTeam {
    team_id: i64,
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    team_city: String,
    team_tricode: String,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
}

// ---------------------------------------------------------------------------
// Box score payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BoxScoreEnvelope {
    game: RawBoxScoreGame,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoxScoreGame {
    game_id: String,
    #[serde(default)]
    game_status_text: String,
    arena: Option<RawArena>,
    home_team: RawBoxScoreTeam,
    away_team: RawBoxScoreTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArena {
    #[serde(default)]
    arena_id: i64,
    #[serde(default)]
    arena_name: String,
    #[serde(default)]
    arena_city: String,
    arena_state: Option<String>,
    arena_country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoxScoreTeam {
    team_id: i64,
    team_name: String,
    team_city: String,
    team_tricode: String,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    players: Vec<RawPlayer>,
    #[serde(default)]
    statistics: RawTeamStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    name: String,
    /// Only present for starters
    position: Option<String>,
    statistics: RawPlayerStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPlayerStatistics {
    minutes: String,
    minutes_calculated: String,
    points: u32,
    rebounds_total: u32,
    assists: u32,
    steals: u32,
    blocks: u32,
    turnovers: u32,
    field_goals_made: u32,
    field_goals_attempted: u32,
    field_goals_percentage: f64,
    three_pointers_made: u32,
    three_pointers_attempted: u32,
    three_pointers_percentage: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTeamStatistics {
    points: u32,
    field_goals_made: u32,
    field_goals_attempted: u32,
    field_goals_percentage: f64,
    three_pointers_made: u32,
    three_pointers_attempted: u32,
    three_pointers_percentage: f64,
    free_throws_made: u32,
    free_throws_attempted: u32,
    free_throws_percentage: f64,
    rebounds_offensive: u32,
    rebounds_defensive: u32,
    rebounds_total: u32,
    assists: u32,
    steals: u32,
    blocks: u32,
    turnovers: u32,
    /// Includes team turnovers; preferred when present
    turnovers_total: Option<u32>,
    fouls_personal: u32,
}

// ---------------------------------------------------------------------------
// Play-by-play payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlayByPlayEnvelope {
    game: RawPlayByPlayGame,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayByPlayGame {
    game_id: String,
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    action_number: u32,
    period: u32,
    #[serde(default)]
    clock: String,
    team_tricode: Option<String>,
    team_id: Option<i64>,
    #[serde(default)]
    score_home: String,
    #[serde(default)]
    score_away: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    action_type: String,
    person_id: Option<i64>,
    player_name: Option<String>,
}

impl LiveDataClient {
    /// Create a new client against the given CDN base URL
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch today's scoreboard
    pub async fn fetch_scoreboard(&self) -> Result<ScoreboardSnapshot, FetchError> {
        let url = format!("{}/scoreboard/todaysScoreboard_00.json", self.base_url);
        debug!("Fetching scoreboard from: {}", url);

        let envelope: ScoreboardEnvelope = fetch_json(self.client.get(&url), "scoreboard").await?;
        let snapshot = normalize_scoreboard(envelope.scoreboard)?;

        info!(
            "Scoreboard for {} has {} games",
            snapshot.game_date,
            snapshot.games.len()
        );
        Ok(snapshot)
    }

    /// Fetch the live box score of a game
    pub async fn fetch_box_score(&self, game_id: &str) -> Result<BoxScoreSnapshot, FetchError> {
        let url = format!("{}/boxscore/boxscore_{}.json", self.base_url, game_id);
        debug!("Fetching box score from: {}", url);

        let envelope: BoxScoreEnvelope = fetch_json(self.client.get(&url), game_id).await?;
        normalize_box_score(envelope.game)
    }

    /// Fetch every play of a game so far
    pub async fn fetch_play_by_play(
        &self,
        game_id: &str,
    ) -> Result<PlayByPlaySnapshot, FetchError> {
        let url = format!("{}/playbyplay/playbyplay_{}.json", self.base_url, game_id);
        debug!("Fetching play-by-play from: {}", url);

        let envelope: PlayByPlayEnvelope = fetch_json(self.client.get(&url), game_id).await?;
        normalize_play_by_play(envelope.game)
    }
}

/// Convert the scoreboard payload; nothing is filtered here
fn normalize_scoreboard(raw: RawScoreboard) -> Result<ScoreboardSnapshot, FetchError> {
    let game_date = NaiveDate::parse_from_str(&raw.game_date, "%Y-%m-%d").map_err(|e| {
        FetchError::Malformed(format!("invalid scoreboard date {:?}: {}", raw.game_date, e))
    })?;

    let games = raw
        .games
        .into_iter()
        .map(|g| GameSummary {
            game_id: g.game_id,
            game_status: GameStatus::from(g.game_status),
            game_status_text: g.game_status_text.trim().to_string(),
            period: g.period,
            game_clock: g.game_clock,
            game_time_utc: g
                .game_time_utc
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            home_team: convert_scoreboard_team(g.home_team),
            away_team: convert_scoreboard_team(g.away_team),
        })
        .collect();

    Ok(ScoreboardSnapshot {
        game_date,
        games,
        retrieved_at: Utc::now(),
    })
}

fn convert_scoreboard_team(team: RawScoreboardTeam) -> TeamSummary {
    TeamSummary {
        team_id: team.team_id,
        team_name: team.team_name,
        team_city: team.team_city,
        team_tricode: team.team_tricode,
        score: team.score,
        wins: team.wins,
        losses: team.losses,
    }
}

/// Flatten player statistics and attach team identity to the team totals
fn normalize_box_score(raw: RawBoxScoreGame) -> Result<BoxScoreSnapshot, FetchError> {
    if raw.game_id.is_empty() {
        return Err(FetchError::Malformed("box score without gameId".to_string()));
    }

    let player_count = raw.home_team.players.len() + raw.away_team.players.len();
    let mut player_stats = Vec::with_capacity(player_count);
    for team in [&raw.home_team, &raw.away_team] {
        player_stats.extend(
            team.players
                .iter()
                .map(|player| convert_player(player, &team.team_tricode)),
        );
    }

    let team_stats = vec![convert_team(&raw.home_team), convert_team(&raw.away_team)];

    Ok(BoxScoreSnapshot {
        game_id: raw.game_id,
        game_status: raw.game_status_text.trim().to_string(),
        arena: raw.arena.map(|a| Arena {
            arena_id: a.arena_id,
            arena_name: a.arena_name,
            arena_city: a.arena_city,
            arena_state: a.arena_state,
            arena_country: a.arena_country,
        }),
        player_stats,
        team_stats,
        retrieved_at: Utc::now(),
    })
}

/// The team tricode comes from the owning team container, not the player
fn convert_player(player: &RawPlayer, team_tricode: &str) -> PlayerLine {
    let stats = &player.statistics;
    let minutes = if stats.minutes_calculated.is_empty() {
        stats.minutes.clone()
    } else {
        stats.minutes_calculated.clone()
    };

    PlayerLine {
        team_abbreviation: team_tricode.to_string(),
        player_name: player.name.clone(),
        start_position: player.position.clone().unwrap_or_default(),
        minutes,
        points: stats.points,
        rebounds: stats.rebounds_total,
        assists: stats.assists,
        steals: stats.steals,
        blocks: stats.blocks,
        turnovers: stats.turnovers,
        field_goals_made: stats.field_goals_made,
        field_goals_attempted: stats.field_goals_attempted,
        field_goals_percentage: stats.field_goals_percentage,
        three_pointers_made: stats.three_pointers_made,
        three_pointers_attempted: stats.three_pointers_attempted,
        three_pointers_percentage: stats.three_pointers_percentage,
    }
}

fn convert_team(team: &RawBoxScoreTeam) -> TeamLine {
    let s = &team.statistics;
    TeamLine {
        team_id: team.team_id,
        team_city: team.team_city.clone(),
        team_name: team.team_name.clone(),
        team_abbreviation: team.team_tricode.clone(),
        team_score: team.score,
        statistics: TeamStatistics {
            points: s.points,
            field_goals_made: s.field_goals_made,
            field_goals_attempted: s.field_goals_attempted,
            field_goals_percentage: s.field_goals_percentage,
            three_pointers_made: s.three_pointers_made,
            three_pointers_attempted: s.three_pointers_attempted,
            three_pointers_percentage: s.three_pointers_percentage,
            free_throws_made: s.free_throws_made,
            free_throws_attempted: s.free_throws_attempted,
            free_throws_percentage: s.free_throws_percentage,
            rebounds_offensive: s.rebounds_offensive,
            rebounds_defensive: s.rebounds_defensive,
            rebounds_total: s.rebounds_total,
            assists: s.assists,
            steals: s.steals,
            blocks: s.blocks,
            turnovers: s.turnovers_total.unwrap_or(s.turnovers),
            fouls_personal: s.fouls_personal,
        },
    }
}

/// Convert the provider's full action list; order is kept as delivered
fn normalize_play_by_play(raw: RawPlayByPlayGame) -> Result<PlayByPlaySnapshot, FetchError> {
    if raw.game_id.is_empty() {
        return Err(FetchError::Malformed("play-by-play without gameId".to_string()));
    }

    let plays = raw
        .actions
        .into_iter()
        .map(convert_action)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlayByPlaySnapshot {
        game_id: raw.game_id,
        plays,
        retrieved_at: Utc::now(),
    })
}

fn convert_action(action: RawAction) -> Result<PlayEvent, FetchError> {
    let score_home = parse_score(&action.score_home, action.action_number)?;
    let score_away = parse_score(&action.score_away, action.action_number)?;

    Ok(PlayEvent {
        action_number: action.action_number,
        period: action.period,
        clock: action.clock,
        team_tricode: action.team_tricode.filter(|t| !t.is_empty()),
        score_home,
        score_away,
        description: action.description,
        action_type: action.action_type,
        // The provider uses 0 for "no actor"
        person_id: action.person_id.filter(|id| *id != 0),
        team_id: action.team_id.filter(|id| *id != 0),
        player_name: action.player_name.filter(|n| !n.is_empty()),
    })
}

fn parse_score(text: &str, action_number: u32) -> Result<u32, FetchError> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| {
        FetchError::Malformed(format!(
            "action {} has non-numeric score {:?}",
            action_number, text
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn box_score_payload() -> serde_json::Value {
        json!({
            "game": {
                "gameId": "0022300001",
                "gameStatusText": "Q3 5:12 ",
                "arena": {
                    "arenaId": 17, "arenaName": "TD Garden",
                    "arenaCity": "Boston", "arenaState": "MA"
                },
                "homeTeam": {
                    "teamId": 1610612738, "teamName": "Celtics", "teamCity": "Boston",
                    "teamTricode": "BOS", "score": 80,
                    "players": [
                        {"name": "Jayson Tatum", "position": "SF",
                         "statistics": {
                             "minutesCalculated": "PT24M", "points": 22, "reboundsTotal": 7
                         }},
                        {"name": "Sam Hauser",
                         "statistics": {"minutes": "PT10M02.00S", "points": 6}}
                    ],
                    "statistics": {
                        "points": 80, "turnovers": 5, "turnoversTotal": 6,
                        "fieldGoalsPercentage": 0.5
                    }
                },
                "awayTeam": {
                    "teamId": 1610612752, "teamName": "Knicks", "teamCity": "New York",
                    "teamTricode": "NYK", "score": 75,
                    "players": [
                        {"name": "Jalen Brunson", "position": "PG",
                         "statistics": {"minutesCalculated": "PT25M", "points": 30}}
                    ],
                    "statistics": {"points": 75}
                }
            }
        })
    }

    #[test]
    fn test_normalize_box_score_flattens_players() {
        let envelope: BoxScoreEnvelope = serde_json::from_value(box_score_payload()).unwrap();
        let snapshot = normalize_box_score(envelope.game).unwrap();

        assert_eq!(snapshot.game_id, "0022300001");
        assert_eq!(snapshot.game_status, "Q3 5:12");
        assert_eq!(snapshot.player_stats.len(), 3);

        let tatum = &snapshot.player_stats[0];
        assert_eq!(tatum.team_abbreviation, "BOS");
        assert_eq!(tatum.start_position, "SF");
        assert_eq!(tatum.minutes, "PT24M");
        assert_eq!(tatum.rebounds, 7);

        let hauser = &snapshot.player_stats[1];
        assert_eq!(hauser.start_position, "");
        assert_eq!(hauser.minutes, "PT10M02.00S");

        assert_eq!(snapshot.player_stats[2].team_abbreviation, "NYK");
    }

    #[test]
    fn test_normalize_box_score_team_identity() {
        let envelope: BoxScoreEnvelope = serde_json::from_value(box_score_payload()).unwrap();
        let snapshot = normalize_box_score(envelope.game).unwrap();

        let home = snapshot.home_team().unwrap();
        assert_eq!(home.team_id, 1610612738);
        assert_eq!(home.team_city, "Boston");
        assert_eq!(home.team_abbreviation, "BOS");
        assert_eq!(home.team_score, 80);
        assert_eq!(home.statistics.turnovers, 6);

        let away = snapshot.away_team().unwrap();
        assert_eq!(away.team_name, "Knicks");
        assert_eq!(away.statistics.turnovers, 0);
        assert_eq!(snapshot.arena.unwrap().arena_name, "TD Garden");
    }

    #[test]
    fn test_box_score_missing_team_is_malformed() {
        let payload = json!({"game": {"gameId": "0022300001", "homeTeam": {}}});
        let result: Result<BoxScoreEnvelope, FetchError> =
            serde_json::from_value(payload).map_err(FetchError::from);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_normalize_scoreboard_keeps_all_games() {
        let envelope: ScoreboardEnvelope = serde_json::from_value(json!({
            "scoreboard": {
                "gameDate": "2024-01-15",
                "games": [
                    {"gameId": "A", "gameStatus": 2, "gameStatusText": "Q2 1:00",
                     "gameTimeUTC": "2024-01-15T17:00:00Z",
                     "homeTeam": {"teamId": 1, "teamTricode": "BOS"},
                     "awayTeam": {"teamId": 2, "teamTricode": "NYK"}},
                    {"gameId": "B", "gameStatus": 3,
                     "homeTeam": {"teamId": 3, "teamTricode": "LAL"},
                     "awayTeam": {"teamId": 4, "teamTricode": "GSW"}}
                ]
            }
        }))
        .unwrap();

        let snapshot = normalize_scoreboard(envelope.scoreboard).unwrap();
        assert_eq!(snapshot.game_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(snapshot.games.len(), 2);
        assert_eq!(snapshot.games[0].game_status, GameStatus::Live);
        assert!(snapshot.games[0].game_time_utc.is_some());
        assert!(snapshot.games[1].game_time_utc.is_none());
        assert_eq!(snapshot.live_game_ids(), vec!["A"]);
    }

    #[test]
    fn test_scoreboard_bad_date_is_malformed() {
        let raw = RawScoreboard {
            game_date: "15/01/2024".to_string(),
            games: vec![],
        };
        assert!(matches!(normalize_scoreboard(raw), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_normalize_play_by_play() {
        let envelope: PlayByPlayEnvelope = serde_json::from_value(json!({
            "game": {
                "gameId": "0022300001",
                "actions": [
                    {"actionNumber": 1, "period": 1, "clock": "PT12M00.00S", "teamTricode": "",
                     "teamId": 0, "personId": 0, "scoreHome": "0", "scoreAway": "0",
                     "description": "Period Start", "actionType": "period"},
                    {"actionNumber": 4, "period": 1, "clock": "PT11M40.00S", "teamTricode": "BOS",
                     "teamId": 1610612738, "personId": 1628369, "playerName": "Tatum",
                     "scoreHome": "2", "scoreAway": "0",
                     "description": "Tatum 5' Layup (2 PTS)", "actionType": "2pt"}
                ]
            }
        }))
        .unwrap();

        let snapshot = normalize_play_by_play(envelope.game).unwrap();
        assert_eq!(snapshot.plays.len(), 2);

        let start = &snapshot.plays[0];
        assert_eq!(start.team_tricode, None);
        assert_eq!(start.person_id, None);

        let layup = &snapshot.plays[1];
        assert_eq!(layup.score_home, 2);
        assert_eq!(layup.person_id, Some(1628369));
        assert_eq!(layup.team_tricode.as_deref(), Some("BOS"));
    }

    #[test]
    fn test_non_numeric_score_is_malformed() {
        let raw = RawPlayByPlayGame {
            game_id: "0022300001".to_string(),
            actions: vec![RawAction {
                action_number: 7,
                period: 1,
                clock: String::new(),
                team_tricode: None,
                team_id: None,
                score_home: "two".to_string(),
                score_away: "0".to_string(),
                description: String::new(),
                action_type: String::new(),
                person_id: None,
                player_name: None,
            }],
        };
        assert!(matches!(normalize_play_by_play(raw), Err(FetchError::Malformed(_))));
    }
}
