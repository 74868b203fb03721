use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time;
use tracing::{error, info, warn};

use crate::api::StatsProvider;
use crate::db::DocumentStore;
use crate::models::LiveGameSet;

/// Worker that periodically discovers which games are in progress
pub struct ActiveGameTracker {
    provider: Arc<dyn StatsProvider>,
    store: DocumentStore,
    live_games: LiveGameSet,
    refresh_interval: Duration,
}

impl ActiveGameTracker {
    /// Create a new active game tracker
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        store: DocumentStore,
        live_games: LiveGameSet,
        refresh_interval_secs: u64,
    ) -> Self {
        Self {
            provider,
            store,
            live_games,
            refresh_interval: Duration::from_secs(refresh_interval_secs),
        }
    }

    /// Run the worker loop
    pub async fn run(&self) {
        info!(
            "Active game tracker started (interval: {:?})",
            self.refresh_interval
        );

        loop {
            if AssertUnwindSafe(self.refresh()).catch_unwind().await.is_err() {
                error!("Active game refresh panicked, will retry on next interval");
            }
            time::sleep(self.refresh_interval).await;
        }
    }

    /// Fetch today's scoreboard and replace the live set with its live games.
    ///
    /// Returns false when the scoreboard could not be fetched, in which case
    /// the previous set is left untouched.
    pub async fn refresh(&self) -> bool {
        info!("Refreshing active games from {}...", self.provider.name());

        let board = match self.provider.scoreboard().await {
            Ok(board) => board,
            Err(e) => {
                let kept = self.live_games.len().await;
                error!("Failed to fetch scoreboard: {}", e);
                warn!("Keeping {} previously tracked games", kept);
                return false;
            }
        };

        let live_ids = board.live_game_ids();
        info!(
            "Active game refresh complete: {} of {} games live on {}",
            live_ids.len(),
            board.games.len(),
            board.game_date
        );
        self.live_games.replace(live_ids).await;

        let mut session = self.store.session();
        if !session.save(&board).await {
            warn!("Failed to persist scoreboard for {}", board.game_date);
        }
        session.close();

        true
    }
}
