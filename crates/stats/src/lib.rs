//! Career statistics, leaderboards and tournament points tables, all derived
//! from persisted [`MatchRecord`](cricket_scorer_store::MatchRecord)s.
//!
//! Players are identified by display name across matches.

pub mod aggregate;
pub mod leaderboard;
pub mod standings;

pub use aggregate::{aggregate, PlayerStats};
pub use leaderboard::{bowling_leaderboard, leaderboard, LEADERBOARD_MATCHES, LEADERBOARD_SIZE};
pub use standings::{standings, TeamStanding, POINTS_FOR_TIE, POINTS_FOR_WIN};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};
    use cricket_scorer_core::MatchState;
    use cricket_scorer_store::MatchRecord;
    use cricket_scorer_types::ScoreCommand;

    /// Play a full default match from a list of commands per innings. Team B's
    /// opening bowler for the chase is Bumrah (id 8).
    pub fn play(first: &[ScoreCommand], second: &[ScoreCommand], minutes_ago: i64) -> MatchRecord {
        let mut m = MatchState::new();
        m.start().unwrap();
        for cmd in first {
            m.apply(cmd.clone());
        }
        while m.innings() == 1 {
            m.apply(ScoreCommand::runs(0));
        }
        m.apply(ScoreCommand::SelectBowler { player_id: 8 });
        for cmd in second {
            m.apply(cmd.clone());
        }
        while !m.ended() {
            m.apply(ScoreCommand::runs(0));
        }
        MatchRecord::from_completed(&m, "local", None, Utc::now() - Duration::minutes(minutes_ago))
            .unwrap()
    }
}
