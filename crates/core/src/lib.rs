//! Core scoring module - pure, deterministic, and testable
//!
//! This crate contains the match scoring state machine and everything derived
//! from it. It performs **no I/O**: persistence, broadcast and rendering all
//! consume the snapshots it produces.
//!
//! # Module Structure
//!
//! - [`match_state`]: the state machine (ball, wicket, over, innings and match transitions)
//! - [`innings`]: frozen per-innings scorecards
//! - [`scoring`]: match result margins and man-of-the-match selection
//! - [`snapshot`]: serializable read-only view for broadcast
//! - [`timeline`]: ball-by-ball records, commentary, worm and manhattan series
//! - [`roster`]: default squads and roster validation
//!
//! # Rules
//!
//! - **Overs**: 6 legal balls; wides and no-balls add one run and are re-bowled
//! - **Strike**: rotates on odd runs and at the end of every over
//! - **Wickets**: a dismissal uses up a legal ball; the next unused batsman in
//!   roster order comes in on strike; ten wickets end the innings
//! - **Chase**: target is first-innings score + 1; reaching it ends the match
//! - **Man of the match**: highest of `runs + 2x4s + 4x6s` and `25xwickets - runs conceded`
//!
//! # Example
//!
//! ```
//! use cricket_scorer_core::{Applied, MatchState};
//! use cricket_scorer_types::ScoreCommand;
//!
//! let mut game = MatchState::new();
//! game.start().unwrap();
//!
//! game.apply(ScoreCommand::runs(1));
//! game.apply(ScoreCommand::boundary(4));
//! let applied = game.apply(ScoreCommand::Wicket);
//! assert!(applied.is_accepted());
//!
//! assert_eq!(game.runs(), 5);
//! assert_eq!(game.wickets(), 1);
//! assert_eq!(game.balls(), 3);
//! ```

pub mod error;
pub mod innings;
pub mod match_state;
pub mod roster;
pub mod scoring;
pub mod snapshot;
pub mod timeline;

pub use cricket_scorer_types as types;

pub use error::MatchSetupError;
pub use innings::InningsSnapshot;
pub use match_state::{Applied, IgnoreReason, MatchState, ScoreEvent};
pub use roster::{default_team_a, default_team_b, validate_team};
pub use scoring::{man_of_match, Margin, MatchResult};
pub use snapshot::MatchSnapshot;
pub use timeline::{manhattan, worm, BallRecord, WormPoint};
