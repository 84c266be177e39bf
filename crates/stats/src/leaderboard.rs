use cricket_scorer_store::MatchRecord;

use crate::{aggregate, PlayerStats};

/// Most recent matches considered for the global leaderboard
pub const LEADERBOARD_MATCHES: usize = 100;

/// Players shown on the global leaderboard
pub const LEADERBOARD_SIZE: usize = 50;

fn recent(records: &[MatchRecord]) -> Vec<MatchRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(LEADERBOARD_MATCHES);
    sorted
}

/// Top run scorers over the most recent matches
pub fn leaderboard(records: &[MatchRecord]) -> Vec<PlayerStats> {
    let mut stats = aggregate(&recent(records));
    stats.truncate(LEADERBOARD_SIZE);
    stats
}

/// Wicket takers over the most recent matches, most wickets first
pub fn bowling_leaderboard(records: &[MatchRecord]) -> Vec<PlayerStats> {
    let mut stats: Vec<PlayerStats> = aggregate(&recent(records))
        .into_iter()
        .filter(|s| s.wickets > 0)
        .collect();
    stats.sort_by(|a, b| b.wickets.cmp(&a.wickets));
    stats.truncate(LEADERBOARD_SIZE);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::play;
    use cricket_scorer_types::ScoreCommand;

    #[test]
    fn test_leaderboard_only_uses_recent_matches() {
        let mut records = Vec::new();
        // one old match where Kohli scores big
        records.push(play(&[ScoreCommand::boundary(6)], &[], 10_000));
        for i in 0..LEADERBOARD_MATCHES {
            records.push(play(&[], &[], i as i64));
        }
        let board = leaderboard(&records);
        assert!(board.iter().all(|s| s.runs == 0));
        assert!(board.len() <= LEADERBOARD_SIZE);
    }

    #[test]
    fn test_bowling_leaderboard_filters_and_sorts() {
        let a = play(&[ScoreCommand::Wicket], &[ScoreCommand::Wicket, ScoreCommand::Wicket], 2);
        let board = bowling_leaderboard(&[a]);
        let names: Vec<&str> = board.iter().map(|s| s.player_name.as_str()).collect();
        assert_eq!(names, vec!["Jasprit Bumrah", "Ben Stokes"]);
    }
}
