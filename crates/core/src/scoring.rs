//! Match result and man-of-the-match selection.

use serde::{Deserialize, Serialize};

use cricket_scorer_types::{BatsmanRecord, BowlerRecord, TeamSide, MAX_WICKETS};

use crate::InningsSnapshot;

/// How the winner won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "margin", rename_all = "snake_case")]
pub enum Margin {
    /// Defending side: first-innings score minus second-innings score
    Runs(u32),
    /// Chasing side: wickets in hand
    Wickets(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: TeamSide,
    pub winner_name: String,
    pub margin: Margin,
}

impl MatchResult {
    /// Decide a completed match. Team A always bats first.
    ///
    /// The chasing side wins only by reaching its target; equal scores go to
    /// the defending side.
    pub fn decide(first: &InningsSnapshot, second: &InningsSnapshot) -> Self {
        let target = second.target.unwrap_or(first.score + 1);
        if second.score >= target {
            Self {
                winner: TeamSide::B,
                winner_name: second.team_name.clone(),
                margin: Margin::Wickets(MAX_WICKETS.saturating_sub(second.wickets)),
            }
        } else {
            Self {
                winner: TeamSide::A,
                winner_name: first.team_name.clone(),
                margin: Margin::Runs(first.score.saturating_sub(second.score)),
            }
        }
    }

    /// e.g. `"Team A won by 12 runs"`, `"Team B won by 1 wicket"`
    pub fn summary(&self) -> String {
        let (n, unit) = match self.margin {
            Margin::Runs(n) => (n, "run"),
            Margin::Wickets(n) => (n, "wicket"),
        };
        let plural = if n == 1 { "" } else { "s" };
        format!("{} won by {} {}{}", self.winner_name, n, unit, plural)
    }
}

/// Pick the man of the match by contribution score.
///
/// Evaluation order is team A batsmen, team B batsmen, team A bowlers,
/// team B bowlers. Only a strictly higher score replaces the leader, so the
/// earliest player wins a tie.
pub fn man_of_match(
    batsmen_a: &[BatsmanRecord],
    batsmen_b: &[BatsmanRecord],
    bowlers_a: &[BowlerRecord],
    bowlers_b: &[BowlerRecord],
) -> Option<String> {
    let batting = batsmen_a
        .iter()
        .chain(batsmen_b)
        .map(|b| (b.contribution(), b.name.as_str()));
    let bowling = bowlers_a
        .iter()
        .chain(bowlers_b)
        .map(|b| (b.contribution(), b.name.as_str()));

    let mut best: i64 = -1;
    let mut top = None;
    for (score, name) in batting.chain(bowling) {
        if score > best {
            best = score;
            top = Some(name);
        }
    }
    top.map(str::to_string)
}
