//! Terminal input for the scorer.
//!
//! Maps `crossterm` key events into [`crate::types::ScoreCommand`]. The key
//! layout depends on the match state: while a new bowler is needed, letter keys
//! pick from [`crate::core::MatchSnapshot::bowler_choices`] instead of scoring.

pub mod map;

pub use cricket_scorer_core as core;
pub use cricket_scorer_types as types;

pub use map::{
    bowler_key, handle_key_event, input_mode, is_start_key, should_quit, InputMode, BOWLER_KEYS,
};
