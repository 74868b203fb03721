use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::http::fetch_json;
use crate::error::FetchError;
use crate::models::{PlayerLine, StaticBoxScoreSnapshot, TeamLine, TeamStatistics};

/// Client for the NBA stats API (post-game traditional box scores)
#[derive(Clone)]
pub struct StatsApiClient {
    client: Client,
    base_url: String,
}

/// Tabular response: named result sets with a header row
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetsResponse {
    result_sets: Vec<RawResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResultSet {
    name: String,
    headers: Vec<String>,
    row_set: Vec<Vec<Value>>,
}

/// One row of a result set, addressed by column name
struct Row<'a> {
    headers: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.values.get(idx).filter(|v| !v.is_null())
    }

    fn require(&self, column: &str) -> Result<&'a Value, FetchError> {
        self.get(column)
            .ok_or_else(|| FetchError::Malformed(format!("missing column {}", column)))
    }

    fn text(&self, column: &str) -> String {
        match self.get(column) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Counting stat; null means the player did not play
    fn count(&self, column: &str) -> u32 {
        self.get(column)
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0)
    }

    fn pct(&self, column: &str) -> f64 {
        self.get(column).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

impl StatsApiClient {
    /// Create a new client against the given stats API base URL
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full-game traditional box score
    pub async fn fetch_static_box_score(
        &self,
        game_id: &str,
    ) -> Result<StaticBoxScoreSnapshot, FetchError> {
        let url = format!("{}/boxscoretraditionalv2", self.base_url);
        debug!("Fetching static box score for {} from: {}", game_id, url);

        // The stats API rejects requests that do not look like they come from nba.com
        let request = self
            .client
            .get(&url)
            .query(&[
                ("GameID", game_id),
                ("StartPeriod", "0"),
                ("EndPeriod", "10"),
                ("StartRange", "0"),
                ("EndRange", "28800"),
                ("RangeType", "0"),
            ])
            .header("Referer", "https://www.nba.com/")
            .header("Origin", "https://www.nba.com")
            .header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64) nba-live-cache");

        let response: ResultSetsResponse = fetch_json(request, game_id).await?;
        normalize_static_box_score(game_id, response)
    }
}

fn find_set<'a>(
    response: &'a ResultSetsResponse,
    name: &str,
) -> Result<&'a RawResultSet, FetchError> {
    response
        .result_sets
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| FetchError::Malformed(format!("missing result set {}", name)))
}

fn rows(set: &RawResultSet) -> impl Iterator<Item = Row<'_>> {
    set.row_set.iter().map(move |values| Row {
        headers: &set.headers,
        values,
    })
}

fn normalize_static_box_score(
    game_id: &str,
    response: ResultSetsResponse,
) -> Result<StaticBoxScoreSnapshot, FetchError> {
    let player_set = find_set(&response, "PlayerStats")?;
    let team_set = find_set(&response, "TeamStats")?;

    // Unknown ids come back as empty tables rather than an error status
    if player_set.row_set.is_empty() && team_set.row_set.is_empty() {
        return Err(FetchError::UnknownGame(game_id.to_string()));
    }

    let player_stats = rows(player_set)
        .map(|row| convert_player_row(&row))
        .collect::<Result<Vec<_>, _>>()?;

    let team_stats = rows(team_set)
        .map(|row| convert_team_row(&row))
        .collect::<Result<Vec<_>, _>>()?;

    let resolved_id = rows(player_set)
        .next()
        .map(|row| row.text("GAME_ID"))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| game_id.to_string());

    Ok(StaticBoxScoreSnapshot {
        game_id: resolved_id,
        player_stats,
        team_stats,
        retrieved_at: Utc::now(),
    })
}

fn convert_player_row(row: &Row<'_>) -> Result<PlayerLine, FetchError> {
    row.require("PLAYER_NAME")?;
    row.require("TEAM_ABBREVIATION")?;

    Ok(PlayerLine {
        team_abbreviation: row.text("TEAM_ABBREVIATION"),
        player_name: row.text("PLAYER_NAME"),
        start_position: row.text("START_POSITION"),
        minutes: row.text("MIN"),
        points: row.count("PTS"),
        rebounds: row.count("REB"),
        assists: row.count("AST"),
        steals: row.count("STL"),
        blocks: row.count("BLK"),
        turnovers: row.count("TO"),
        field_goals_made: row.count("FGM"),
        field_goals_attempted: row.count("FGA"),
        field_goals_percentage: row.pct("FG_PCT"),
        three_pointers_made: row.count("FG3M"),
        three_pointers_attempted: row.count("FG3A"),
        three_pointers_percentage: row.pct("FG3_PCT"),
    })
}

fn convert_team_row(row: &Row<'_>) -> Result<TeamLine, FetchError> {
    let team_id = row
        .require("TEAM_ID")?
        .as_i64()
        .ok_or_else(|| FetchError::Malformed("TEAM_ID is not an integer".to_string()))?;

    Ok(TeamLine {
        team_id,
        team_city: row.text("TEAM_CITY"),
        team_name: row.text("TEAM_NAME"),
        team_abbreviation: row.text("TEAM_ABBREVIATION"),
        team_score: row.count("PTS"),
        statistics: TeamStatistics {
            points: row.count("PTS"),
            field_goals_made: row.count("FGM"),
            field_goals_attempted: row.count("FGA"),
            field_goals_percentage: row.pct("FG_PCT"),
            three_pointers_made: row.count("FG3M"),
            three_pointers_attempted: row.count("FG3A"),
            three_pointers_percentage: row.pct("FG3_PCT"),
            free_throws_made: row.count("FTM"),
            free_throws_attempted: row.count("FTA"),
            free_throws_percentage: row.pct("FT_PCT"),
            rebounds_offensive: row.count("OREB"),
            rebounds_defensive: row.count("DREB"),
            rebounds_total: row.count("REB"),
            assists: row.count("AST"),
            steals: row.count("STL"),
            blocks: row.count("BLK"),
            turnovers: row.count("TO"),
            fouls_personal: row.count("PF"),
        },
    })
}
