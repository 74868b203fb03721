pub mod gemini;
pub mod http;
pub mod live_data;
pub mod nba;
pub mod provider;
pub mod stats_api;

pub use gemini::GeminiClient;
pub use live_data::LiveDataClient;
pub use nba::NbaProvider;
pub use provider::StatsProvider;
pub use stats_api::StatsApiClient;
