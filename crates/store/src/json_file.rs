//! File-backed store: `matches.json`, `teams.json` and `tournaments.json`
//! under one data directory.
//!
//! Each collection is loaded once on open and rewritten whole after every
//! change. Writes go to a sibling temp file that is then renamed over the
//! original, so a crash mid-write leaves the previous document intact.
//! A change is made on a copy and only kept once its file is written, so a
//! failed write leaves memory and disk in agreement.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use cricket_scorer_types::Player;

use crate::memory::Collections;
use crate::{MatchRecord, Result, Store, TeamRecord, Tournament};

const MATCHES_FILE: &str = "matches.json";
const TEAMS_FILE: &str = "teams.json";
const TOURNAMENTS_FILE: &str = "tournaments.json";

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    data: Collections,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let data = Collections {
            matches: load(&dir.join(MATCHES_FILE))?,
            teams: load(&dir.join(TEAMS_FILE))?,
            tournaments: load(&dir.join(TOURNAMENTS_FILE))?,
        };
        info!(
            dir = %dir.display(),
            matches = data.matches.len(),
            teams = data.teams.len(),
            tournaments = data.tournaments.len(),
            "store opened"
        );
        Ok(Self { dir, data })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply `change` to a copy of the collections, write the touched
    /// collection, then keep the copy.
    fn commit<T>(
        &mut self,
        collection: Collection,
        change: impl FnOnce(&mut Collections) -> Result<T>,
    ) -> Result<T> {
        let mut staged = self.data.clone();
        let out = change(&mut staged)?;
        collection.write(&self.dir, &staged)?;
        self.data = staged;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Matches,
    Teams,
    Tournaments,
}

impl Collection {
    fn write(self, dir: &Path, data: &Collections) -> Result<()> {
        match self {
            Collection::Matches => write_atomic(&dir.join(MATCHES_FILE), &data.matches),
            Collection::Teams => write_atomic(&dir.join(TEAMS_FILE), &data.teams),
            Collection::Tournaments => write_atomic(&dir.join(TOURNAMENTS_FILE), &data.tournaments),
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&text)?)
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "collection written");
    Ok(())
}

impl Store for JsonFileStore {
    fn save_match(&mut self, record: MatchRecord) -> Result<String> {
        self.commit(Collection::Matches, |data| Ok(data.save_match(record)))
    }

    fn list_matches(&self, owner_id: &str) -> Result<Vec<MatchRecord>> {
        Ok(self.data.list_matches(owner_id))
    }

    fn get_match(&self, id: &str) -> Result<MatchRecord> {
        self.data.get_match(id)
    }

    fn delete_match(&mut self, id: &str) -> Result<()> {
        self.commit(Collection::Matches, |data| data.delete_match(id))
    }

    fn all_matches(&self, limit: usize) -> Result<Vec<MatchRecord>> {
        Ok(self.data.all_matches(limit))
    }

    fn save_team(&mut self, record: TeamRecord) -> Result<String> {
        self.commit(Collection::Teams, |data| Ok(data.save_team(record)))
    }

    fn list_teams(&self, owner_id: &str) -> Result<Vec<TeamRecord>> {
        Ok(self.data.list_teams(owner_id))
    }

    fn update_team(&mut self, id: &str, name: &str, players: Vec<Player>) -> Result<()> {
        self.commit(Collection::Teams, |data| data.update_team(id, name, players))
    }

    fn delete_team(&mut self, id: &str) -> Result<()> {
        self.commit(Collection::Teams, |data| data.delete_team(id))
    }

    fn create_tournament(
        &mut self,
        owner_id: &str,
        name: &str,
        teams: Vec<String>,
        match_type: &str,
    ) -> Result<String> {
        self.commit(Collection::Tournaments, |data| {
            Ok(data.create_tournament(owner_id, name, teams, match_type))
        })
    }

    fn list_tournaments(&self, owner_id: &str) -> Result<Vec<Tournament>> {
        Ok(self.data.list_tournaments(owner_id))
    }

    fn get_tournament(&self, id: &str) -> Result<Tournament> {
        self.data.get_tournament(id)
    }

    fn add_match_to_tournament(&mut self, tournament_id: &str, match_id: &str) -> Result<()> {
        self.commit(Collection::Tournaments, |data| {
            data.add_match_to_tournament(tournament_id, match_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use chrono::Utc;
    use cricket_scorer_types::{Role, Team};

    fn squad(name: &str) -> Team {
        let players = (1..=11)
            .map(|i| Player::new(i, &format!("Player {i}"), Role::AllRounder))
            .collect();
        Team::new(name, players)
    }

    #[test]
    fn test_open_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested")).unwrap();
        assert!(store.all_matches(10).unwrap().is_empty());
        assert!(store.dir().exists());
    }

    #[test]
    fn test_tournament_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = JsonFileStore::open(dir.path()).unwrap();
            let id = store
                .create_tournament("local", "Cup", vec!["Team A".into()], "T20")
                .unwrap();
            store.add_match_to_tournament(&id, "m-9").unwrap();
            id
        };
        assert!(!dir.path().join("tournaments.json.tmp").exists());

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get_tournament(&id).unwrap().match_ids, vec!["m-9"]);
    }

    #[test]
    fn test_failed_write_keeps_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let mut store = JsonFileStore::open(&data).unwrap();
        let kept = store
            .save_team(TeamRecord::new("local", &squad("Kept"), Utc::now()))
            .unwrap();

        fs::remove_dir_all(&data).unwrap();
        assert!(store
            .save_team(TeamRecord::new("local", &squad("Lost"), Utc::now()))
            .is_err());
        assert!(store.delete_team(&kept).is_err());
        assert!(store
            .create_tournament("local", "Cup", vec!["Kept".into()], "T2")
            .is_err());

        let teams = store.list_teams("local").unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, kept);
        assert!(store.list_tournaments("local").unwrap().is_empty());

        // The next good write does not resurrect the failed one.
        fs::create_dir_all(&data).unwrap();
        store
            .save_team(TeamRecord::new("local", &squad("Later"), Utc::now()))
            .unwrap();
        let reopened = JsonFileStore::open(&data).unwrap();
        let names: Vec<String> = reopened
            .list_teams("local")
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(!names.iter().any(|n| n == "Lost"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MATCHES_FILE), "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(dir.path()),
            Err(StoreError::Serialization(_))
        ));
    }
}
