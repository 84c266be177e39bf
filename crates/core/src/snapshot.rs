//! Read-only match document published to viewers and observers.

use serde::{Deserialize, Serialize};

use cricket_scorer_types::{
    format_overs, BatsmanRecord, BowlerRecord, Player, Team, TeamSide, BALLS_PER_OVER,
    DEFAULT_TOTAL_OVERS,
};

use crate::roster::{default_team_a, default_team_b};
use crate::timeline::BallRecord;
use crate::InningsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub started: bool,
    pub innings: u8,
    pub team_a: Team,
    pub team_b: Team,
    pub innings1: Option<InningsSnapshot>,
    pub innings2: Option<InningsSnapshot>,
    pub batting: TeamSide,
    pub runs: u32,
    pub wickets: u32,
    pub balls: u32,
    pub extras: u32,
    pub crease: [usize; 2],
    pub batsmen_a: Vec<BatsmanRecord>,
    pub batsmen_b: Vec<BatsmanRecord>,
    pub bowlers_a: Vec<BowlerRecord>,
    pub bowlers_b: Vec<BowlerRecord>,
    pub bowler_index: usize,
    pub target: u32,
    pub ended: bool,
    pub winner: Option<String>,
    pub man_of_match: Option<String>,
    pub total_overs: u32,
    pub awaiting_bowler: bool,
    pub result_summary: Option<String>,
    pub last_ball: Option<BallRecord>,
}

impl MatchSnapshot {
    pub fn batting_team(&self) -> &Team {
        match self.batting {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    pub fn fielding_team(&self) -> &Team {
        match self.batting {
            TeamSide::A => &self.team_b,
            TeamSide::B => &self.team_a,
        }
    }

    pub fn batting_records(&self) -> &[BatsmanRecord] {
        match self.batting {
            TeamSide::A => &self.batsmen_a,
            TeamSide::B => &self.batsmen_b,
        }
    }

    pub fn fielding_bowlers(&self) -> &[BowlerRecord] {
        match self.batting {
            TeamSide::A => &self.bowlers_b,
            TeamSide::B => &self.bowlers_a,
        }
    }

    /// Batsmen at the crease, looked up the same way the scorer does
    pub fn current_batsmen(&self) -> Vec<&BatsmanRecord> {
        let records = self.batting_records();
        self.crease.iter().filter_map(|&i| records.get(i)).collect()
    }

    pub fn current_bowler(&self) -> Option<&BowlerRecord> {
        self.fielding_bowlers().get(self.bowler_index)
    }

    /// Players offered when a new bowler is needed: the fielding side's
    /// bowlers and all-rounders other than the one who just bowled. Falls back
    /// to the whole fielding roster when nobody else is eligible.
    pub fn bowler_choices(&self) -> Vec<&Player> {
        let current = self.current_bowler().map(|b| b.id);
        let fielding = self.fielding_team();
        let eligible: Vec<&Player> = fielding
            .eligible_bowlers()
            .filter(|p| Some(p.id) != current)
            .collect();
        if !eligible.is_empty() {
            return eligible;
        }
        fielding.players.iter().filter(|p| Some(p.id) != current).collect()
    }

    pub fn overs_display(&self) -> String {
        format_overs(self.balls)
    }

    pub fn run_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        self.runs as f64 * BALLS_PER_OVER as f64 / self.balls as f64
    }

    /// Runs needed while chasing
    pub fn runs_needed(&self) -> Option<u32> {
        (self.started && self.innings == 2 && !self.ended)
            .then(|| self.target.saturating_sub(self.runs))
    }

    pub fn balls_remaining(&self) -> u32 {
        self.total_overs.saturating_mul(BALLS_PER_OVER).saturating_sub(self.balls)
    }

    /// Scoring can continue
    pub fn live(&self) -> bool {
        self.started && !self.ended
    }
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            started: false,
            innings: 1,
            team_a: default_team_a(),
            team_b: default_team_b(),
            innings1: None,
            innings2: None,
            batting: TeamSide::A,
            runs: 0,
            wickets: 0,
            balls: 0,
            extras: 0,
            crease: [0, 1],
            batsmen_a: Vec::new(),
            batsmen_b: Vec::new(),
            bowlers_a: Vec::new(),
            bowlers_b: Vec::new(),
            bowler_index: 0,
            target: 0,
            ended: false,
            winner: None,
            man_of_match: None,
            total_overs: DEFAULT_TOTAL_OVERS,
            awaiting_bowler: false,
            result_summary: None,
            last_ball: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::MatchState;
    use cricket_scorer_types::ScoreCommand;

    use super::*;

    #[test]
    fn test_snapshot_indexes_like_the_scorer() {
        let mut m = MatchState::new();
        m.start().unwrap();
        m.apply(ScoreCommand::runs(1));
        let snap = m.snapshot();
        let names: Vec<&str> = snap.current_batsmen().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Virat Kohli", "Rohit Sharma"]);
        assert_eq!(snap.current_bowler().map(|b| b.name.as_str()), Some("Ben Stokes"));
        assert_eq!(snap.last_ball.as_ref().map(|b| b.runs), Some(1));
        assert!(snap.live());
    }

    #[test]
    fn test_snapshot_into_reuses_buffer() {
        let mut m = MatchState::new();
        m.start().unwrap();
        let mut snap = MatchSnapshot::default();
        m.snapshot_into(&mut snap);
        assert_eq!(snap.batsmen_a.len(), 11);
        m.apply(ScoreCommand::Reset);
        m.snapshot_into(&mut snap);
        assert!(snap.batsmen_a.is_empty());
        assert!(!snap.started);
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut m = MatchState::new();
        m.start().unwrap();
        m.apply(ScoreCommand::boundary(4));
        let snap = m.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"batsmen_a\""));
        let back: MatchSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_bowler_choices_skip_current_bowler_and_batsmen() {
        let mut m = MatchState::new();
        m.start().unwrap();
        let snap = m.snapshot();
        let choices: Vec<u32> = snap.bowler_choices().iter().map(|p| p.id).collect();
        // Stokes (15) is on; pure batsmen are not offered.
        assert_eq!(choices, vec![16, 18, 19, 20, 21, 22]);
    }
}
