use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nba_live_cache::api::{GeminiClient, NbaProvider, StatsProvider};
use nba_live_cache::assistant::Assistant;
use nba_live_cache::cache::ReadThrough;
use nba_live_cache::config::Config;
use nba_live_cache::db::DocumentStore;
use nba_live_cache::models::LiveGameSet;
use nba_live_cache::server::{self, AppState};
use nba_live_cache::workers::{ActiveGameTracker, LiveRefreshWorker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nba_live_cache=info,tower_http=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting nba-live-cache");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Initialize database
    let store = DocumentStore::new(&config.database_url).await?;
    info!("Database initialized");

    // Initialize API clients
    let provider: Arc<dyn StatsProvider> = Arc::new(NbaProvider::new(
        &config.live_data_url,
        &config.stats_url,
        config.provider_timeout(),
    )?);

    let gemini = match &config.gemini_api_key {
        Some(key) => Some(GeminiClient::new(key, &config.gemini_model)?),
        None => {
            warn!("GEMINI_API_KEY not set, assistant route will answer 503");
            None
        }
    };
    info!("API clients initialized");

    // Shared state
    let live_games = LiveGameSet::new();

    // Create workers
    let tracker = ActiveGameTracker::new(
        Arc::clone(&provider),
        store.clone(),
        live_games.clone(),
        config.active_games_refresh_interval,
    );

    let refresher = LiveRefreshWorker::new(
        Arc::clone(&provider),
        store.clone(),
        live_games.clone(),
        config.live_poll_interval,
    );

    let state = AppState::new(
        ReadThrough::new(Arc::clone(&provider), store.clone()),
        live_games.clone(),
        Assistant::new(gemini, store.clone(), live_games),
    );

    info!("Workers created, starting...");

    // Spawn workers
    let tracker_handle = tokio::spawn(async move {
        tracker.run().await;
    });

    let refresher_handle = tokio::spawn(async move {
        refresher.run().await;
    });

    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let server_handle = tokio::spawn(async move { server::serve(state, &bind_addr, port).await });

    info!("All workers started");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = tracker_handle => {
            error!("Active game tracker exited unexpectedly: {:?}", result);
        }
        result = refresher_handle => {
            error!("Live refresh exited unexpectedly: {:?}", result);
        }
        result = server_handle => {
            error!("HTTP server exited unexpectedly: {:?}", result);
        }
    }

    store.close().await;
    info!("Shutting down nba-live-cache");
    Ok(())
}
