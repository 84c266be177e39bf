use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cricket_scorer_types::Player;

use crate::{
    MatchRecord, Result, Store, StoreError, TeamRecord, Tournament, TournamentStatus,
};

/// The three collections, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Collections {
    pub matches: Vec<MatchRecord>,
    pub teams: Vec<TeamRecord>,
    pub tournaments: Vec<Tournament>,
}

/// Newest first. Insertion order breaks timestamp ties (later insert first).
fn newest_first<T: Clone, K: Ord>(items: &[T], key: impl Fn(&T) -> K, keep: impl Fn(&T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().filter(|t| keep(t)).cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

impl Collections {
    pub fn save_match(&mut self, record: MatchRecord) -> String {
        let id = record.id.clone();
        self.matches.push(record);
        id
    }

    pub fn list_matches(&self, owner_id: &str) -> Vec<MatchRecord> {
        newest_first(&self.matches, |m| m.created_at, |m| m.owner_id == owner_id)
    }

    pub fn get_match(&self, id: &str) -> Result<MatchRecord> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("match", id))
    }

    pub fn delete_match(&mut self, id: &str) -> Result<()> {
        let before = self.matches.len();
        self.matches.retain(|m| m.id != id);
        if self.matches.len() == before {
            return Err(StoreError::not_found("match", id));
        }
        Ok(())
    }

    pub fn all_matches(&self, limit: usize) -> Vec<MatchRecord> {
        let mut all = newest_first(&self.matches, |m| m.created_at, |_| true);
        all.truncate(limit);
        all
    }

    pub fn save_team(&mut self, record: TeamRecord) -> String {
        let id = record.id.clone();
        self.teams.push(record);
        id
    }

    pub fn list_teams(&self, owner_id: &str) -> Vec<TeamRecord> {
        newest_first(&self.teams, |t| t.created_at, |t| t.owner_id == owner_id)
    }

    pub fn update_team(&mut self, id: &str, name: &str, players: Vec<Player>) -> Result<()> {
        let team = self
            .teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("team", id))?;
        team.name = name.to_string();
        team.players = players;
        Ok(())
    }

    pub fn delete_team(&mut self, id: &str) -> Result<()> {
        let before = self.teams.len();
        self.teams.retain(|t| t.id != id);
        if self.teams.len() == before {
            return Err(StoreError::not_found("team", id));
        }
        Ok(())
    }

    pub fn create_tournament(
        &mut self,
        owner_id: &str,
        name: &str,
        teams: Vec<String>,
        match_type: &str,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        self.tournaments.push(Tournament {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            match_type: match_type.to_string(),
            teams,
            match_ids: Vec::new(),
            status: TournamentStatus::Active,
            created_at: Utc::now(),
        });
        id
    }

    pub fn list_tournaments(&self, owner_id: &str) -> Vec<Tournament> {
        newest_first(&self.tournaments, |t| t.created_at, |t| t.owner_id == owner_id)
    }

    pub fn get_tournament(&self, id: &str) -> Result<Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("tournament", id))
    }

    pub fn add_match_to_tournament(&mut self, tournament_id: &str, match_id: &str) -> Result<()> {
        let tournament = self
            .tournaments
            .iter_mut()
            .find(|t| t.id == tournament_id)
            .ok_or_else(|| StoreError::not_found("tournament", tournament_id))?;
        if !tournament.match_ids.iter().any(|m| m == match_id) {
            tournament.match_ids.push(match_id.to_string());
        }
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Collections,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn save_match(&mut self, record: MatchRecord) -> Result<String> {
        Ok(self.data.save_match(record))
    }

    fn list_matches(&self, owner_id: &str) -> Result<Vec<MatchRecord>> {
        Ok(self.data.list_matches(owner_id))
    }

    fn get_match(&self, id: &str) -> Result<MatchRecord> {
        self.data.get_match(id)
    }

    fn delete_match(&mut self, id: &str) -> Result<()> {
        self.data.delete_match(id)
    }

    fn all_matches(&self, limit: usize) -> Result<Vec<MatchRecord>> {
        Ok(self.data.all_matches(limit))
    }

    fn save_team(&mut self, record: TeamRecord) -> Result<String> {
        Ok(self.data.save_team(record))
    }

    fn list_teams(&self, owner_id: &str) -> Result<Vec<TeamRecord>> {
        Ok(self.data.list_teams(owner_id))
    }

    fn update_team(&mut self, id: &str, name: &str, players: Vec<Player>) -> Result<()> {
        self.data.update_team(id, name, players)
    }

    fn delete_team(&mut self, id: &str) -> Result<()> {
        self.data.delete_team(id)
    }

    fn create_tournament(
        &mut self,
        owner_id: &str,
        name: &str,
        teams: Vec<String>,
        match_type: &str,
    ) -> Result<String> {
        Ok(self.data.create_tournament(owner_id, name, teams, match_type))
    }

    fn list_tournaments(&self, owner_id: &str) -> Result<Vec<Tournament>> {
        Ok(self.data.list_tournaments(owner_id))
    }

    fn get_tournament(&self, id: &str) -> Result<Tournament> {
        self.data.get_tournament(id)
    }

    fn add_match_to_tournament(&mut self, tournament_id: &str, match_id: &str) -> Result<()> {
        self.data.add_match_to_tournament(tournament_id, match_id)
    }
}
