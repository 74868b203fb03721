use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    BoxScoreSnapshot, PlayByPlaySnapshot, ScoreboardSnapshot, StaticBoxScoreSnapshot,
};

/// A snapshot type stored in its own collection under a fixed natural key
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Logical database name
    const DATABASE: &'static str;

    /// Collection within the database
    const COLLECTION: &'static str;

    /// Name of the natural key field, for logging
    const KEY_FIELD: &'static str;

    /// Value of the natural key
    fn natural_key(&self) -> String;

    /// When the snapshot was fetched from the provider
    fn retrieved_at(&self) -> DateTime<Utc>;
}

impl Document for ScoreboardSnapshot {
    const DATABASE: &'static str = "Scoreboards";
    const COLLECTION: &'static str = "scoreboard";
    const KEY_FIELD: &'static str = "gameDate";

    fn natural_key(&self) -> String {
        self.game_date.format("%Y-%m-%d").to_string()
    }

    fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}

impl Document for BoxScoreSnapshot {
    const DATABASE: &'static str = "Boxscores";
    const COLLECTION: &'static str = "live_boxscores";
    const KEY_FIELD: &'static str = "gameId";

    fn natural_key(&self) -> String {
        self.game_id.clone()
    }

    fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}

impl Document for StaticBoxScoreSnapshot {
    const DATABASE: &'static str = "Boxscores";
    const COLLECTION: &'static str = "static_boxscores";
    const KEY_FIELD: &'static str = "gameId";

    fn natural_key(&self) -> String {
        self.game_id.clone()
    }

    fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}

impl Document for PlayByPlaySnapshot {
    const DATABASE: &'static str = "PlayByPlay";
    const COLLECTION: &'static str = "play_by_play";
    const KEY_FIELD: &'static str = "gameId";

    fn natural_key(&self) -> String {
        self.game_id.clone()
    }

    fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}
