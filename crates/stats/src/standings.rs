//! Tournament points table.
//!
//! | Result | Points |
//! |--------|--------|
//! | Win | 2 |
//! | Tie / no winner | 1 each |
//! | Loss | 0 |
//!
//! Net run rate is runs scored per over faced minus runs conceded per over
//! bowled. A side bowled out is charged its full quota of overs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cricket_scorer_core::InningsSnapshot;
use cricket_scorer_store::{MatchRecord, Tournament};
use cricket_scorer_types::{BALLS_PER_OVER, MAX_WICKETS};

pub const POINTS_FOR_WIN: u32 = 2;
pub const POINTS_FOR_TIE: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub points: u32,
    pub runs_scored: u32,
    pub balls_faced: u32,
    pub runs_conceded: u32,
    pub balls_bowled: u32,
}

impl TeamStanding {
    fn new(name: &str) -> Self {
        Self {
            team_name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn net_run_rate(&self) -> f64 {
        per_over(self.runs_scored, self.balls_faced) - per_over(self.runs_conceded, self.balls_bowled)
    }

    fn bat(&mut self, innings: &InningsSnapshot, quota: u32) {
        self.runs_scored += innings.score;
        self.balls_faced += charged_balls(innings, quota);
    }

    fn bowl(&mut self, innings: &InningsSnapshot, quota: u32) {
        self.runs_conceded += innings.score;
        self.balls_bowled += charged_balls(innings, quota);
    }
}

fn per_over(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    runs as f64 * BALLS_PER_OVER as f64 / balls as f64
}

fn charged_balls(innings: &InningsSnapshot, quota: u32) -> u32 {
    if innings.wickets >= MAX_WICKETS {
        quota
    } else {
        innings.balls
    }
}

/// Points table for the matches a tournament lists. Matches between teams
/// that are not both members are skipped. Sorted by points, then net run rate.
pub fn standings(tournament: &Tournament, records: &[MatchRecord]) -> Vec<TeamStanding> {
    let mut table: Vec<TeamStanding> = tournament.teams.iter().map(|t| TeamStanding::new(t)).collect();
    let position: HashMap<&str, usize> = tournament
        .teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();
    let by_id: HashMap<&str, &MatchRecord> = records.iter().map(|r| (r.id.as_str(), r)).collect();

    for id in &tournament.match_ids {
        let Some(record) = by_id.get(id.as_str()) else {
            continue;
        };
        let (Some(&a), Some(&b)) = (
            position.get(record.team_a_name.as_str()),
            position.get(record.team_b_name.as_str()),
        ) else {
            continue;
        };
        if a == b {
            continue;
        }
        let quota = record.total_overs.saturating_mul(BALLS_PER_OVER);

        table[a].played += 1;
        table[b].played += 1;
        if record.winner == record.team_a_name {
            table[a].won += 1;
            table[a].points += POINTS_FOR_WIN;
            table[b].lost += 1;
        } else if record.winner == record.team_b_name {
            table[b].won += 1;
            table[b].points += POINTS_FOR_WIN;
            table[a].lost += 1;
        } else {
            for i in [a, b] {
                table[i].tied += 1;
                table[i].points += POINTS_FOR_TIE;
            }
        }

        table[a].bat(&record.innings1, quota);
        table[a].bowl(&record.innings2, quota);
        table[b].bat(&record.innings2, quota);
        table[b].bowl(&record.innings1, quota);
    }

    table.sort_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then_with(|| y.net_run_rate().total_cmp(&x.net_run_rate()))
    });
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::play;
    use chrono::Utc;
    use cricket_scorer_store::TournamentStatus;
    use cricket_scorer_types::ScoreCommand;

    fn tournament(teams: &[&str], match_ids: Vec<String>) -> Tournament {
        Tournament {
            id: "t".into(),
            owner_id: "local".into(),
            name: "Cup".into(),
            match_type: "T2".into(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
            match_ids,
            status: TournamentStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_points_and_nrr() {
        // Team A 12/0 in 2 overs, Team B 0/0 in 2 overs
        let rec = play(&vec![ScoreCommand::runs(2); 6], &[], 0);
        let t = tournament(&["Team A", "Team B", "Team C"], vec![rec.id.clone()]);
        let table = standings(&t, &[rec]);

        assert_eq!(table[0].team_name, "Team A");
        assert_eq!((table[0].played, table[0].won, table[0].points), (1, 1, 2));
        assert!((table[0].net_run_rate() - 6.0).abs() < 1e-9);
        assert_eq!(table[1].team_name, "Team C");
        assert_eq!(table[1].played, 0);
        assert_eq!(table[2].team_name, "Team B");
        assert_eq!(table[2].lost, 1);
        assert!((table[2].net_run_rate() + 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_when_winner_unrecognised() {
        let mut rec = play(&[], &[], 0);
        rec.winner = String::new();
        let t = tournament(&["Team A", "Team B"], vec![rec.id.clone()]);
        let table = standings(&t, &[rec]);
        assert!(table.iter().all(|s| s.tied == 1 && s.points == POINTS_FOR_TIE));
    }

    #[test]
    fn test_unknown_match_ids_skipped() {
        let t = tournament(&["Team A", "Team B"], vec!["missing".into()]);
        let table = standings(&t, &[]);
        assert!(table.iter().all(|s| s.played == 0));
    }
}
