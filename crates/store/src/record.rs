//! Persisted documents: completed matches, saved squads and tournaments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cricket_scorer_core::{BallRecord, InningsSnapshot, MatchResult, MatchState};
use cricket_scorer_types::{BatsmanRecord, BowlerRecord, Player, Team, TeamSide};

/// A completed match, both scorecards plus identifying metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub team_a_name: String,
    pub team_b_name: String,
    pub innings1: InningsSnapshot,
    pub innings2: InningsSnapshot,
    pub winner: String,
    pub man_of_match: String,
    pub result: String,
    pub total_overs: u32,
    #[serde(default)]
    pub timeline: Vec<BallRecord>,
}

impl MatchRecord {
    /// Build the record for an ended match; `None` while the match is live.
    pub fn from_completed(
        state: &MatchState,
        owner_id: &str,
        tournament_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if !state.ended() {
            return None;
        }
        let innings1 = state.innings1()?.clone();
        let innings2 = state.innings2()?.clone();
        let result = state.result()?;

        Some(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            tournament_id: tournament_id.map(str::to_string),
            created_at: now,
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            team_a_name: state.team(TeamSide::A).name.clone(),
            team_b_name: state.team(TeamSide::B).name.clone(),
            innings1,
            innings2,
            winner: result.winner_name.clone(),
            man_of_match: state.man_of_match().unwrap_or_default().to_string(),
            result: result.summary(),
            total_overs: state.total_overs(),
            timeline: state.timeline().to_vec(),
        })
    }

    pub fn match_result(&self) -> MatchResult {
        MatchResult::decide(&self.innings1, &self.innings2)
    }

    /// Team A batted in innings 1, team B in innings 2
    pub fn batsmen(&self, side: TeamSide) -> &[BatsmanRecord] {
        match side {
            TeamSide::A => &self.innings1.batsmen,
            TeamSide::B => &self.innings2.batsmen,
        }
    }

    /// Team A bowled innings 2, team B innings 1
    pub fn bowlers(&self, side: TeamSide) -> &[BowlerRecord] {
        match side {
            TeamSide::A => &self.innings2.bowlers,
            TeamSide::B => &self.innings1.bowlers,
        }
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::A => &self.team_a_name,
            TeamSide::B => &self.team_b_name,
        }
    }

    /// `"Team A 50/3 (2.0) vs Team B 51/3 (1.4)"`
    pub fn headline(&self) -> String {
        format!(
            "{} {} vs {} {}",
            self.team_a_name,
            self.innings1.scoreline(),
            self.team_b_name,
            self.innings2.scoreline()
        )
    }
}

/// A saved squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
}

impl TeamRecord {
    pub fn new(owner_id: &str, team: &Team, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: team.name.clone(),
            players: team.players.clone(),
            created_at: now,
        }
    }

    pub fn to_team(&self) -> Team {
        Team::new(self.name.clone(), self.players.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    /// Free text such as `T20` or `ODI`
    pub match_type: String,
    /// Member team names
    pub teams: Vec<String>,
    pub match_ids: Vec<String>,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_scorer_types::ScoreCommand;

    fn completed_match() -> MatchState {
        let mut m = MatchState::new();
        m.start().unwrap();
        for _ in 0..12 {
            m.apply(ScoreCommand::runs(1));
        }
        m.apply(ScoreCommand::SelectBowler { player_id: 8 });
        for _ in 0..12 {
            m.apply(ScoreCommand::runs(0));
        }
        m
    }

    #[test]
    fn test_live_match_has_no_record() {
        let mut m = MatchState::new();
        m.start().unwrap();
        assert!(MatchRecord::from_completed(&m, "local", None, Utc::now()).is_none());
    }

    #[test]
    fn test_record_from_completed_match() {
        let m = completed_match();
        let now = DateTime::parse_from_rfc3339("2024-03-01T18:30:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let rec = MatchRecord::from_completed(&m, "scorer-1", Some("t-1"), now).unwrap();
        assert_eq!(rec.owner_id, "scorer-1");
        assert_eq!(rec.tournament_id.as_deref(), Some("t-1"));
        assert_eq!(rec.date, "2024-03-01");
        assert_eq!(rec.time, "18:30:05");
        assert_eq!(rec.winner, "Team A");
        assert_eq!(rec.result, "Team A won by 12 runs");
        assert_eq!(rec.innings1.score, 12);
        assert_eq!(rec.innings2.target, Some(13));
        assert_eq!(rec.bowlers(TeamSide::A)[0].name, "Jasprit Bumrah");
        assert_eq!(rec.timeline.len(), 24);
        assert_eq!(rec.match_result().summary(), rec.result);
        assert_eq!(rec.headline(), "Team A 12/0 (2.0) vs Team B 0/0 (2.0)");
        assert!(Uuid::parse_str(&rec.id).is_ok());
    }

    #[test]
    fn test_team_record_round_trip() {
        let team = cricket_scorer_core::default_team_b();
        let rec = TeamRecord::new("local", &team, Utc::now());
        assert_eq!(rec.to_team(), team);
    }
}
