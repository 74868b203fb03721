use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nba_live_cache::api::{NbaProvider, StatsProvider};
use nba_live_cache::config::Config;
use nba_live_cache::db::{Document, DocumentStore};
use nba_live_cache::format::{
    format_box_score, format_play_by_play, format_scoreboard, format_static_box_score,
};

/// Fetch NBA game data from the provider and print it
#[derive(Parser, Debug)]
#[command(name = "fetch_game", version, about)]
struct Cli {
    /// Persist the fetched snapshot to the document store
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Today's scoreboard
    Scoreboard,

    /// Live box score for a game
    Boxscore { game_id: String },

    /// Post-game traditional box score for a game
    Static { game_id: String },

    /// Play-by-play for a game
    PlayByPlay {
        game_id: String,

        /// Only print the last N plays
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_game=info,nba_live_cache=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let provider = NbaProvider::new(
        &config.live_data_url,
        &config.stats_url,
        config.provider_timeout(),
    )?;

    let store = if cli.save {
        Some(DocumentStore::new(&config.database_url).await?)
    } else {
        None
    };

    let text = match cli.command {
        Command::Scoreboard => {
            let board = provider.scoreboard().await.context("Failed to fetch scoreboard")?;
            save(store.as_ref(), &board).await;
            format_scoreboard(&board)
        }
        Command::Boxscore { game_id } => {
            let box_score = provider
                .box_score(&game_id)
                .await
                .with_context(|| format!("Failed to fetch box score for {}", game_id))?;
            save(store.as_ref(), &box_score).await;
            format_box_score(&box_score)
        }
        Command::Static { game_id } => {
            let box_score = provider
                .static_box_score(&game_id)
                .await
                .with_context(|| format!("Failed to fetch static box score for {}", game_id))?;
            save(store.as_ref(), &box_score).await;
            format_static_box_score(&box_score)
        }
        Command::PlayByPlay { game_id, limit } => {
            let plays = provider
                .play_by_play(&game_id)
                .await
                .with_context(|| format!("Failed to fetch play-by-play for {}", game_id))?;
            save(store.as_ref(), &plays).await;
            match limit {
                Some(limit) => format_play_by_play(&plays.latest(limit)),
                None => format_play_by_play(&plays),
            }
        }
    };

    println!("{}", text);
    Ok(())
}

/// Persist the full snapshot when `--save` was given
async fn save<D: Document>(store: Option<&DocumentStore>, doc: &D) {
    let Some(store) = store else {
        return;
    };

    let mut session = store.session();
    if session.save(doc).await {
        info!("Saved {} {}={}", D::COLLECTION, D::KEY_FIELD, doc.natural_key());
    } else {
        warn!("Could not save {} {}={}", D::COLLECTION, D::KEY_FIELD, doc.natural_key());
    }
    session.close();
}
