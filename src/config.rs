use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// NBA live data CDN base URL
    pub live_data_url: String,

    /// NBA stats API base URL
    pub stats_url: String,

    /// Interval in seconds for refreshing box scores and play-by-play
    pub live_poll_interval: u64,

    /// Interval in seconds for rediscovering live games
    pub active_games_refresh_interval: u64,

    /// Total timeout in seconds for provider requests
    pub provider_timeout: u64,

    /// SQLite database path
    pub database_url: String,

    /// HTTP bind address and port
    pub bind_addr: String,
    pub port: u16,

    /// Gemini API key; the assistant is disabled without it
    pub gemini_api_key: Option<String>,

    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            live_data_url: env::var("NBA_LIVE_DATA_URL")
                .unwrap_or_else(|_| "https://cdn.nba.com/static/json/liveData".to_string()),

            stats_url: env::var("NBA_STATS_URL")
                .unwrap_or_else(|_| "https://stats.nba.com/stats".to_string()),

            live_poll_interval: env::var("LIVE_POLL_INTERVAL")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("LIVE_POLL_INTERVAL must be a valid number")?,

            active_games_refresh_interval: env::var("ACTIVE_GAMES_REFRESH_INTERVAL")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("ACTIVE_GAMES_REFRESH_INTERVAL must be a valid number")?,

            provider_timeout: env::var("PROVIDER_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("PROVIDER_TIMEOUT must be a valid number")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/nba_live.db".to_string()),

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,

            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),

            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
        })
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout)
    }
}
