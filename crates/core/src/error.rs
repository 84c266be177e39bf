use cricket_scorer_types::PlayerId;
use thiserror::Error;

/// Reasons a match cannot be configured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchSetupError {
    #[error("team name must not be empty")]
    EmptyTeamName,

    #[error("{team} has {count} players, expected {expected}")]
    WrongSquadSize {
        team: String,
        count: usize,
        expected: usize,
    },

    #[error("{team} lists player id {id} more than once")]
    DuplicatePlayerId { team: String, id: PlayerId },

    #[error("{team}: player {id} has no name")]
    EmptyPlayerName { team: String, id: PlayerId },

    #[error("a match needs at least one over per innings")]
    NoOvers,
}
