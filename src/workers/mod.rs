pub mod active_games;
pub mod live_refresh;

pub use active_games::ActiveGameTracker;
pub use live_refresh::{CycleReport, LiveRefreshWorker};
