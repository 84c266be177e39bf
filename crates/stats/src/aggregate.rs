use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cricket_scorer_store::MatchRecord;
use cricket_scorer_types::{format_overs, BatsmanRecord, BowlerRecord, TeamSide, BALLS_PER_OVER};

/// Career figures for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_name: String,
    /// Innings batted (at least one ball faced)
    pub matches: u32,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub highest_score: u32,
    pub not_outs: u32,
    pub wickets: u32,
    pub runs_conceded: u32,
    pub overs_bowled: u32,
    pub balls_bowled: u32,
    pub best_bowling_wickets: u32,
    pub best_bowling_runs: u32,
}

impl PlayerStats {
    fn new(name: &str) -> Self {
        Self {
            player_name: name.to_string(),
            ..Self::default()
        }
    }

    /// Runs per dismissal; all runs when never dismissed
    pub fn batting_average(&self) -> f64 {
        let dismissals = self.matches.saturating_sub(self.not_outs);
        if dismissals == 0 {
            return self.runs as f64;
        }
        self.runs as f64 / dismissals as f64
    }

    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        self.runs as f64 * 100.0 / self.balls as f64
    }

    pub fn total_balls_bowled(&self) -> u32 {
        self.overs_bowled * BALLS_PER_OVER + self.balls_bowled
    }

    pub fn overs_display(&self) -> String {
        format_overs(self.total_balls_bowled())
    }

    pub fn economy(&self) -> f64 {
        let balls = self.total_balls_bowled();
        if balls == 0 {
            return 0.0;
        }
        self.runs_conceded as f64 * BALLS_PER_OVER as f64 / balls as f64
    }

    /// `"W/R"`
    pub fn best_bowling(&self) -> String {
        format!("{}/{}", self.best_bowling_wickets, self.best_bowling_runs)
    }

    pub fn has_bowled(&self) -> bool {
        self.total_balls_bowled() > 0
    }

    fn add_innings(&mut self, b: &BatsmanRecord) {
        self.matches += 1;
        self.runs += b.runs;
        self.balls += b.balls;
        self.fours += b.fours;
        self.sixes += b.sixes;
        self.highest_score = self.highest_score.max(b.runs);
        if !b.is_out {
            self.not_outs += 1;
        }
    }

    fn add_spell(&mut self, b: &BowlerRecord) {
        self.wickets += b.wickets;
        self.runs_conceded += b.runs;
        self.overs_bowled += b.overs;
        self.balls_bowled += b.balls;

        if b.wickets > self.best_bowling_wickets {
            self.best_bowling_wickets = b.wickets;
            self.best_bowling_runs = b.runs;
        } else if b.wickets == self.best_bowling_wickets
            && (b.runs < self.best_bowling_runs || self.best_bowling_runs == 0)
        {
            self.best_bowling_runs = b.runs;
        }
    }
}

fn entry<'a>(
    order: &'a mut Vec<PlayerStats>,
    index: &mut HashMap<String, usize>,
    name: &str,
) -> &'a mut PlayerStats {
    let i = *index.entry(name.to_string()).or_insert_with(|| {
        order.push(PlayerStats::new(name));
        order.len() - 1
    });
    &mut order[i]
}

/// Fold match records into per-player figures, most runs first.
///
/// A batting innings counts only when the player faced a ball; a spell only
/// when at least one legal ball was bowled.
pub fn aggregate(records: &[MatchRecord]) -> Vec<PlayerStats> {
    let mut order: Vec<PlayerStats> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        for side in [TeamSide::A, TeamSide::B] {
            for b in record.batsmen(side).iter().filter(|b| b.balls > 0) {
                entry(&mut order, &mut index, &b.name).add_innings(b);
            }
        }
        for side in [TeamSide::A, TeamSide::B] {
            for b in record.bowlers(side).iter().filter(|b| b.has_bowled()) {
                entry(&mut order, &mut index, &b.name).add_spell(b);
            }
        }
    }

    order.sort_by(|a, b| b.runs.cmp(&a.runs));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::play;
    use cricket_scorer_types::ScoreCommand;

    #[test]
    fn test_batting_counted_only_when_faced() {
        let rec = play(&[ScoreCommand::boundary(4), ScoreCommand::runs(1)], &[], 0);
        let stats = aggregate(&[rec]);
        let kohli = stats.iter().find(|s| s.player_name == "Virat Kohli").unwrap();
        assert_eq!((kohli.matches, kohli.runs, kohli.fours, kohli.not_outs), (1, 5, 1, 1));
        // Gill never faced a ball
        assert!(!stats.iter().any(|s| s.player_name == "Shubman Gill"));
        assert_eq!(stats[0].player_name, "Virat Kohli");
    }

    #[test]
    fn test_career_totals_across_matches() {
        let a = play(&[ScoreCommand::runs(2)], &[], 10);
        let b = play(&[ScoreCommand::runs(6), ScoreCommand::Wicket], &[], 5);
        let stats = aggregate(&[a, b]);
        let kohli = stats.iter().find(|s| s.player_name == "Virat Kohli").unwrap();
        assert_eq!(kohli.matches, 2);
        assert_eq!(kohli.runs, 8);
        assert_eq!(kohli.highest_score, 6);
        assert_eq!(kohli.not_outs, 1);
        assert!((kohli.batting_average() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_bowling_figures_and_best() {
        let a = play(&[ScoreCommand::Wicket, ScoreCommand::runs(4)], &[], 10);
        let b = play(&[ScoreCommand::Wicket, ScoreCommand::runs(1)], &[], 5);
        let stats = aggregate(&[a, b]);
        let stokes = stats.iter().find(|s| s.player_name == "Ben Stokes").unwrap();
        assert_eq!(stokes.wickets, 2);
        assert_eq!(stokes.runs_conceded, 5);
        assert_eq!(stokes.total_balls_bowled(), 24);
        assert_eq!(stokes.best_bowling(), "1/1");
        assert!((stokes.economy() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_best_bowling_replaces_zero_runs() {
        let mut s = PlayerStats::new("x");
        let mut spell = BowlerRecord {
            id: 1,
            name: "x".into(),
            overs: 1,
            balls: 0,
            runs: 9,
            wickets: 0,
        };
        s.add_spell(&spell);
        assert_eq!(s.best_bowling(), "0/9");
        spell.runs = 12;
        s.add_spell(&spell);
        assert_eq!(s.best_bowling(), "0/9");
        spell.wickets = 1;
        spell.runs = 20;
        s.add_spell(&spell);
        assert_eq!(s.best_bowling(), "1/20");
    }
}
