use serde::{Deserialize, Serialize};

use cricket_scorer_types::{format_overs, BatsmanRecord, BowlerRecord, BALLS_PER_OVER};

/// A completed innings, frozen when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsSnapshot {
    pub team_name: String,
    pub score: u32,
    pub wickets: u32,
    /// Legal balls bowled
    pub balls: u32,
    /// Wides and no-balls conceded
    #[serde(default)]
    pub extras: u32,
    pub batsmen: Vec<BatsmanRecord>,
    /// Only bowlers who delivered at least one legal ball
    pub bowlers: Vec<BowlerRecord>,
    /// Set for the chasing innings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

impl InningsSnapshot {
    /// Freeze an innings. Bowlers who never bowled a legal ball are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn freeze(
        team_name: &str,
        score: u32,
        wickets: u32,
        balls: u32,
        extras: u32,
        batsmen: &[BatsmanRecord],
        bowlers: &[BowlerRecord],
        target: Option<u32>,
    ) -> Self {
        Self {
            team_name: team_name.to_string(),
            score,
            wickets,
            balls,
            extras,
            batsmen: batsmen.to_vec(),
            bowlers: bowlers.iter().filter(|b| b.has_bowled()).cloned().collect(),
            target,
        }
    }

    pub fn overs_display(&self) -> String {
        format_overs(self.balls)
    }

    /// Runs per over (0 when no legal ball was bowled)
    pub fn run_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        self.score as f64 * BALLS_PER_OVER as f64 / self.balls as f64
    }

    /// `"R/W (O.B)"`
    pub fn scoreline(&self) -> String {
        format!("{}/{} ({})", self.score, self.wickets, self.overs_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_scorer_types::{Player, Role};

    #[test]
    fn test_freeze_drops_idle_bowlers() {
        let mut used = BowlerRecord::fresh(&Player::new(8, "Bumrah", Role::Bowler));
        used.balls = 1;
        let idle = BowlerRecord::fresh(&Player::new(9, "Siraj", Role::Bowler));
        let snap = InningsSnapshot::freeze("Team B", 7, 0, 1, 0, &[], &[used.clone(), idle], None);
        assert_eq!(snap.bowlers, vec![used]);
        assert_eq!(snap.scoreline(), "7/0 (0.1)");
        assert!((snap.run_rate() - 42.0).abs() < f64::EPSILON);
    }
}
