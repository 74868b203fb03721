use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, warn};

use crate::api::http::build_client;
use crate::api::{LiveDataClient, StatsApiClient, StatsProvider};
use crate::error::FetchError;
use crate::models::{
    BoxScoreSnapshot, PlayByPlaySnapshot, ScoreboardSnapshot, StaticBoxScoreSnapshot,
};

/// NBA provider backed by the live data CDN and the stats API
#[derive(Clone)]
pub struct NbaProvider {
    live: LiveDataClient,
    stats: StatsApiClient,
}

impl NbaProvider {
    /// Create a provider sharing one HTTP client between both APIs
    pub fn new(live_data_url: &str, stats_url: &str, timeout: Duration) -> Result<Self> {
        let client = build_client(timeout)?;
        Ok(Self {
            live: LiveDataClient::new(client.clone(), live_data_url),
            stats: StatsApiClient::new(client, stats_url),
        })
    }
}

/// Log a failed fetch at the boundary before handing it to the caller
fn log_failure<T>(what: &str, key: &str, result: Result<T, FetchError>) -> Result<T, FetchError> {
    match &result {
        Err(e) if e.is_unknown_game() => {
            warn!("[NbaProvider] No {} for {}: {}", what, key, e);
        }
        Err(e) => error!("[NbaProvider] Error fetching {} for {}: {}", what, key, e),
        Ok(_) => {}
    }
    result
}

#[async_trait]
impl StatsProvider for NbaProvider {
    async fn scoreboard(&self) -> Result<ScoreboardSnapshot, FetchError> {
        log_failure("scoreboard", "today", self.live.fetch_scoreboard().await)
    }

    async fn box_score(&self, game_id: &str) -> Result<BoxScoreSnapshot, FetchError> {
        log_failure("box score", game_id, self.live.fetch_box_score(game_id).await)
    }

    async fn play_by_play(&self, game_id: &str) -> Result<PlayByPlaySnapshot, FetchError> {
        log_failure("play-by-play", game_id, self.live.fetch_play_by_play(game_id).await)
    }

    async fn static_box_score(&self, game_id: &str) -> Result<StaticBoxScoreSnapshot, FetchError> {
        log_failure(
            "static box score",
            game_id,
            self.stats.fetch_static_box_score(game_id).await,
        )
    }

    fn name(&self) -> &str {
        "nba"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_failure_passes_result_through() {
        let missing = log_failure::<()>(
            "box score",
            "0022300001",
            Err(FetchError::UnknownGame("0022300001".into())),
        );
        assert!(missing.unwrap_err().is_unknown_game());

        let down = log_failure::<()>(
            "box score",
            "0022300001",
            Err(FetchError::Transient("502".into())),
        );
        assert!(!down.unwrap_err().is_unknown_game());

        assert_eq!(log_failure("scoreboard", "today", Ok(3)).unwrap(), 3);
    }
}
