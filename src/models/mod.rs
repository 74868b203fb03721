pub mod box_score;
pub mod live_games;
pub mod play_by_play;
pub mod scoreboard;

pub use box_score::{
    team_players, Arena, BoxScoreSnapshot, PlayerLine, StaticBoxScoreSnapshot, TeamLine,
    TeamStatistics,
};
pub use live_games::LiveGameSet;
pub use play_by_play::{PlayByPlaySnapshot, PlayEvent, DEFAULT_PLAY_LIMIT};
pub use scoreboard::{GameStatus, GameSummary, ScoreboardSnapshot, TeamSummary};
