//! Persistence store for completed matches, saved squads and tournaments.
//!
//! Everything is keyed by an owner id (the scorer identity). Lists come back
//! most recent first.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | tests and sessions that do not persist |
//! | [`JsonFileStore`] | one JSON document per collection under a data directory |
//!
//! # Example
//!
//! ```
//! use cricket_scorer_store::{MemoryStore, Store};
//!
//! let mut store = MemoryStore::new();
//! let id = store
//!     .create_tournament("local", "Summer Cup", vec!["Team A".into(), "Team B".into()], "T2")
//!     .unwrap();
//! store.add_match_to_tournament(&id, "m-1").unwrap();
//! assert_eq!(store.get_tournament(&id).unwrap().match_ids, vec!["m-1"]);
//! assert!(store.delete_match("missing").unwrap_err().is_not_found());
//! ```

pub mod error;
pub mod json_file;
pub mod memory;
pub mod record;

pub use error::{Result, StoreError};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{MatchRecord, TeamRecord, Tournament, TournamentStatus};

use cricket_scorer_types::Player;

/// Durable storage contract
pub trait Store {
    /// Persist a completed match, returning its id
    fn save_match(&mut self, record: MatchRecord) -> Result<String>;
    /// Matches owned by `owner_id`, most recent first
    fn list_matches(&self, owner_id: &str) -> Result<Vec<MatchRecord>>;
    fn get_match(&self, id: &str) -> Result<MatchRecord>;
    fn delete_match(&mut self, id: &str) -> Result<()>;
    /// Matches across every owner, most recent first, at most `limit`
    fn all_matches(&self, limit: usize) -> Result<Vec<MatchRecord>>;

    fn save_team(&mut self, record: TeamRecord) -> Result<String>;
    fn list_teams(&self, owner_id: &str) -> Result<Vec<TeamRecord>>;
    fn update_team(&mut self, id: &str, name: &str, players: Vec<Player>) -> Result<()>;
    fn delete_team(&mut self, id: &str) -> Result<()>;

    fn create_tournament(
        &mut self,
        owner_id: &str,
        name: &str,
        teams: Vec<String>,
        match_type: &str,
    ) -> Result<String>;
    fn list_tournaments(&self, owner_id: &str) -> Result<Vec<Tournament>>;
    fn get_tournament(&self, id: &str) -> Result<Tournament>;
    /// Append a match id (no duplicates)
    fn add_match_to_tournament(&mut self, tournament_id: &str, match_id: &str) -> Result<()>;
}
