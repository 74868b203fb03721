use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::StatsProvider;
use crate::db::{Document, DocumentStore};
use crate::error::FetchError;
use crate::models::{
    BoxScoreSnapshot, PlayByPlaySnapshot, ScoreboardSnapshot, StaticBoxScoreSnapshot,
};

/// Outcome of a read-through lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Served from the store
    Cached(T),
    /// Fetched from the provider on a miss
    Fetched(T),
    /// Provider does not know this key
    NotFound,
    /// Provider unreachable or returned an unusable payload
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Cached(v) => Lookup::Cached(f(v)),
            Lookup::Fetched(v) => Lookup::Fetched(f(v)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Cached(_))
    }
}

impl<T> From<FetchError> for Lookup<T> {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::UnknownGame(_) => Lookup::NotFound,
            other => Lookup::Unavailable(other.to_string()),
        }
    }
}

/// Store-first accessor that falls back to the provider and populates the
/// store on a miss
#[derive(Clone)]
pub struct ReadThrough {
    provider: Arc<dyn StatsProvider>,
    store: DocumentStore,
}

impl ReadThrough {
    pub fn new(provider: Arc<dyn StatsProvider>, store: DocumentStore) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Live box score for a game
    pub async fn box_score(&self, game_id: &str) -> Lookup<BoxScoreSnapshot> {
        self.read_through(game_id, || self.provider.box_score(game_id))
            .await
    }

    /// Post-game box score for a game
    pub async fn static_box_score(&self, game_id: &str) -> Lookup<StaticBoxScoreSnapshot> {
        self.read_through(game_id, || self.provider.static_box_score(game_id))
            .await
    }

    /// Play-by-play for a game; `limit` keeps only the last N plays
    pub async fn play_by_play(
        &self,
        game_id: &str,
        limit: Option<usize>,
    ) -> Lookup<PlayByPlaySnapshot> {
        let lookup = self
            .read_through(game_id, || self.provider.play_by_play(game_id))
            .await;

        match limit {
            Some(limit) => lookup.map(|snapshot| snapshot.latest(limit)),
            None => lookup,
        }
    }

    /// Today's scoreboard, fetched fresh and persisted.
    ///
    /// When the provider fails the most recently stored scoreboard is
    /// returned as a cache hit instead.
    pub async fn scoreboard(&self) -> Lookup<ScoreboardSnapshot> {
        match self.provider.scoreboard().await {
            Ok(board) => {
                let mut session = self.store.session();
                if !session.save(&board).await {
                    warn!(
                        "Serving scoreboard for {} without persisting it",
                        board.game_date
                    );
                }
                session.close();
                Lookup::Fetched(board)
            }
            Err(e) => {
                warn!("Fresh scoreboard unavailable ({}), trying stored copy", e);
                let mut session = self.store.session();
                let stored = session.latest::<ScoreboardSnapshot>().await;
                session.close();

                match stored {
                    Some(board) => {
                        info!("Serving stored scoreboard for {}", board.game_date);
                        Lookup::Cached(board)
                    }
                    None => Lookup::from(e),
                }
            }
        }
    }

    /// Stored scoreboard for a past date; never reaches the provider
    pub async fn scoreboard_on(&self, date: NaiveDate) -> Lookup<ScoreboardSnapshot> {
        let key = date.format("%Y-%m-%d").to_string();
        let mut session = self.store.session();
        let stored = session.get::<ScoreboardSnapshot>(&key).await;
        session.close();

        match stored {
            Some(board) => Lookup::Cached(board),
            None => Lookup::NotFound,
        }
    }

    async fn read_through<D, F, Fut>(&self, key: &str, fetch: F) -> Lookup<D>
    where
        D: Document,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<D, FetchError>>,
    {
        let mut session = self.store.session();

        if let Some(doc) = session.get::<D>(key).await {
            debug!("Cache hit for {} {}={}", D::COLLECTION, D::KEY_FIELD, key);
            session.close();
            return Lookup::Cached(doc);
        }

        debug!("Cache miss for {} {}={}, fetching", D::COLLECTION, D::KEY_FIELD, key);

        let lookup = match fetch().await {
            Ok(doc) => {
                // Data is still served when persisting fails
                if !session.save(&doc).await {
                    warn!(
                        "Fetched {} {}={} but could not persist it",
                        D::COLLECTION,
                        D::KEY_FIELD,
                        key
                    );
                }
                Lookup::Fetched(doc)
            }
            Err(e) => Lookup::from(e),
        };

        session.close();
        lookup
    }
}
