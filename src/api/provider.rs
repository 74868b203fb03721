use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{
    BoxScoreSnapshot, PlayByPlaySnapshot, ScoreboardSnapshot, StaticBoxScoreSnapshot,
};

/// Source of normalized game snapshots.
///
/// Every method either returns a complete snapshot or a typed failure; there
/// are no partial results.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Today's scoreboard in the provider's own timezone
    async fn scoreboard(&self) -> Result<ScoreboardSnapshot, FetchError>;

    /// Live box score for a game
    async fn box_score(&self, game_id: &str) -> Result<BoxScoreSnapshot, FetchError>;

    /// Complete play list for a game
    async fn play_by_play(&self, game_id: &str) -> Result<PlayByPlaySnapshot, FetchError>;

    /// Post-game traditional box score
    async fn static_box_score(&self, game_id: &str) -> Result<StaticBoxScoreSnapshot, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}
