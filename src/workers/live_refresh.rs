use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::api::StatsProvider;
use crate::db::{DocumentStore, Session};
use crate::models::LiveGameSet;

/// Per-cycle tally of what the refresh loop managed to persist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Games the cycle attempted
    pub games: usize,
    pub box_scores_saved: usize,
    pub play_by_play_saved: usize,
    /// Fetch or persist failures, one per snapshot
    pub failures: usize,
}

/// Worker that refreshes box scores and play-by-play for every live game
pub struct LiveRefreshWorker {
    provider: Arc<dyn StatsProvider>,
    store: DocumentStore,
    live_games: LiveGameSet,
    poll_interval: Duration,
}

impl LiveRefreshWorker {
    /// Create a new live refresh worker
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        store: DocumentStore,
        live_games: LiveGameSet,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            provider,
            store,
            live_games,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }

    /// Run the worker loop
    pub async fn run(&self) {
        info!("Live refresh started (interval: {:?})", self.poll_interval);

        loop {
            if AssertUnwindSafe(self.refresh_cycle()).catch_unwind().await.is_err() {
                error!("Live refresh cycle panicked, will retry on next interval");
            }
            time::sleep(self.poll_interval).await;
        }
    }

    /// Perform a single refresh cycle over the current live set
    pub async fn refresh_cycle(&self) -> CycleReport {
        let game_ids = self.live_games.snapshot().await;
        if game_ids.is_empty() {
            debug!("No live games, skipping refresh");
            return CycleReport::default();
        }

        info!("Refreshing {} live games", game_ids.len());

        let mut report = CycleReport {
            games: game_ids.len(),
            ..Default::default()
        };

        let mut session = self.store.session();
        for game_id in &game_ids {
            self.refresh_game(&mut session, game_id, &mut report).await;
        }
        session.close();

        if report.failures > 0 {
            warn!(
                "Refresh cycle finished with {} failures ({} box scores, {} play-by-play saved)",
                report.failures, report.box_scores_saved, report.play_by_play_saved
            );
        } else {
            info!(
                "Refresh cycle complete: {} box scores, {} play-by-play saved",
                report.box_scores_saved, report.play_by_play_saved
            );
        }

        report
    }

    /// Fetch and persist both snapshots of one game; failures stay local
    async fn refresh_game(&self, session: &mut Session, game_id: &str, report: &mut CycleReport) {
        match self.provider.box_score(game_id).await {
            Ok(box_score) => {
                if session.save(&box_score).await {
                    report.box_scores_saved += 1;
                } else {
                    report.failures += 1;
                }
            }
            Err(e) => {
                error!("Failed to refresh box score for {}: {}", game_id, e);
                report.failures += 1;
            }
        }

        match self.provider.play_by_play(game_id).await {
            Ok(plays) => {
                debug!("Game {}: {} plays", game_id, plays.plays.len());
                if session.save(&plays).await {
                    report.play_by_play_saved += 1;
                } else {
                    report.failures += 1;
                }
            }
            Err(e) => {
                error!("Failed to refresh play-by-play for {}: {}", game_id, e);
                report.failures += 1;
            }
        }
    }
}
