//! Plain-text renderings of snapshots for the CLI and the assistant context

use crate::models::{
    team_players, BoxScoreSnapshot, PlayByPlaySnapshot, PlayerLine, ScoreboardSnapshot,
    StaticBoxScoreSnapshot, TeamLine,
};

/// Render a scoreboard, one line per game
pub fn format_scoreboard(board: &ScoreboardSnapshot) -> String {
    let mut lines = vec![format!("===== NBA SCOREBOARD {} =====", board.game_date)];

    if board.games.is_empty() {
        lines.push("No games scheduled".to_string());
    }

    for game in &board.games {
        let tip_off = game
            .game_time_utc
            .map(|t| t.format("%H:%M UTC").to_string())
            .unwrap_or_else(|| "TBD".to_string());

        lines.push(format!(
            "{}: {} {} {} @ {} {} {} | {} | tip-off {}",
            game.game_id,
            game.away_team.team_city,
            game.away_team.team_name,
            game.away_team.score,
            game.home_team.team_city,
            game.home_team.team_name,
            game.home_team.score,
            game.game_status_text,
            tip_off
        ));
    }

    lines.join("\n")
}

/// Render a live box score: status, arena, team totals and player lines
pub fn format_box_score(box_score: &BoxScoreSnapshot) -> String {
    let mut lines = vec![format!("===== GAME STATUS: {} =====", box_score.game_status)];

    if let Some(arena) = &box_score.arena {
        lines.push(format!(
            "Arena: {} in {}, {}",
            arena.arena_name,
            arena.arena_city,
            arena.arena_state.as_deref().unwrap_or("N/A")
        ));
    }

    lines.push(String::new());
    lines.push("===== TEAM STATS =====".to_string());
    push_team_lines(&mut lines, &box_score.team_stats);

    lines.push(String::new());
    lines.push("===== PLAYER STATS =====".to_string());
    push_player_lines(&mut lines, &box_score.team_stats, &box_score.player_stats);

    lines.join("\n")
}

/// Render a post-game box score
pub fn format_static_box_score(box_score: &StaticBoxScoreSnapshot) -> String {
    let mut lines = vec![format!("===== FINAL BOX SCORE {} =====", box_score.game_id)];

    lines.push(String::new());
    lines.push("===== TEAM STATS =====".to_string());
    push_team_lines(&mut lines, &box_score.team_stats);

    lines.push(String::new());
    lines.push("===== PLAYER STATS =====".to_string());
    push_player_lines(&mut lines, &box_score.team_stats, &box_score.player_stats);

    lines.join("\n")
}

/// Render plays in stored order
pub fn format_play_by_play(plays: &PlayByPlaySnapshot) -> String {
    let mut lines = vec![format!("===== PLAY-BY-PLAY {} =====", plays.game_id)];

    for play in &plays.plays {
        let actor = match (&play.team_tricode, &play.player_name) {
            (Some(team), Some(name)) => format!(" [{} {}]", team, name),
            (Some(team), None) => format!(" [{}]", team),
            (None, Some(name)) => format!(" [{}]", name),
            (None, None) => String::new(),
        };

        lines.push(format!(
            "{}: Q{} {} {}-{}{} {}",
            play.action_number,
            play.period,
            clock_display(&play.clock),
            play.score_away,
            play.score_home,
            actor,
            play.description
        ));
    }

    lines.join("\n")
}

/// Convert an ISO-8601 period clock such as `PT03M51.00S` to `03:51`.
///
/// The seconds part may be absent (`PT24M` is `24:00`). Text that is not in
/// either form is returned unchanged.
pub fn clock_display(clock: &str) -> String {
    let parsed = clock
        .strip_prefix("PT")
        .and_then(|rest| rest.split_once('M'))
        .and_then(|(minutes, rest)| {
            let minutes: u32 = minutes.parse().ok()?;
            let seconds: f64 = if rest.is_empty() {
                0.0
            } else {
                rest.strip_suffix('S')?.parse().ok()?
            };
            Some((minutes, seconds.trunc() as u32))
        });

    match parsed {
        Some((minutes, seconds)) => format!("{:02}:{:02}", minutes, seconds),
        None => clock.to_string(),
    }
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn push_team_lines(lines: &mut Vec<String>, teams: &[TeamLine]) {
    for team in teams {
        let stats = &team.statistics;
        lines.push(format!(
            "{} {} ({}): {} pts",
            team.team_city, team.team_name, team.team_abbreviation, team.team_score
        ));
        lines.push(format!(
            "FG%: {}, 3P%: {}, FT%: {}",
            percent(stats.field_goals_percentage),
            percent(stats.three_pointers_percentage),
            percent(stats.free_throws_percentage)
        ));
        lines.push(format!(
            "Rebounds: {}, Assists: {}, Turnovers: {}",
            stats.rebounds_total, stats.assists, stats.turnovers
        ));
    }
}

/// Player lines grouped by team (team order first, then first appearance),
/// highest scorers first within each team
fn push_player_lines(lines: &mut Vec<String>, teams: &[TeamLine], players: &[PlayerLine]) {
    let mut order: Vec<&str> = teams.iter().map(|t| t.team_abbreviation.as_str()).collect();
    for player in players {
        if !order.contains(&player.team_abbreviation.as_str()) {
            order.push(&player.team_abbreviation);
        }
    }

    for abbreviation in order {
        let roster = team_players(players, abbreviation);
        if roster.is_empty() {
            continue;
        }

        lines.push(format!("{} Players:", abbreviation));
        for p in roster {
            lines.push(format!(
                "{} - {} pts, {} reb, {} ast, {} min",
                p.player_name,
                p.points,
                p.rebounds,
                p.assists,
                clock_display(&p.minutes)
            ));
        }
    }
}
