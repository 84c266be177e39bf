//! Ball-by-ball timeline, commentary and chart series.
//!
//! Every accepted delivery (legal ball, extra or wicket) appends one
//! [`BallRecord`]. The scoreboard shows the records as a commentary feed; the
//! analytics helpers fold them into the two classic limited-overs charts:
//!
//! - **Worm**: cumulative score after each delivery
//! - **Manhattan**: runs per over, extras included

use serde::{Deserialize, Serialize};

use cricket_scorer_types::{BoundaryKind, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRecord {
    pub innings: u8,
    pub team: TeamSide,
    /// Zero-based over index
    pub over: u32,
    /// Legal ball number within the over (1..=6); for an extra, the legal balls
    /// already bowled in the over
    pub ball: u32,
    /// Runs added to the team total by this delivery
    pub runs: u32,
    pub is_extra: bool,
    pub is_wicket: bool,
    pub is_boundary: bool,
    pub total_score: u32,
    pub total_wickets: u32,
    pub batsman_name: String,
    pub bowler_name: String,
    pub commentary: String,
}

impl BallRecord {
    /// `"O.B"` label as shown in the feed
    pub fn label(&self) -> String {
        format!("{}.{}", self.over, self.ball)
    }
}

/// What happened on a delivery, for commentary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Runs(u32),
    Boundary(BoundaryKind),
    Extra,
    Wicket { duck: bool },
}

/// One line of commentary for a delivery.
pub fn commentary(delivery: Delivery, batsman: &str, bowler: &str) -> String {
    match delivery {
        Delivery::Boundary(BoundaryKind::Six) => {
            format!("SIX! {} launches {} over the rope.", batsman, bowler)
        }
        Delivery::Boundary(BoundaryKind::Four) => {
            format!("FOUR! {} finds the fence off {}.", batsman, bowler)
        }
        Delivery::Extra => format!("Extra from {}, one run added. Ball to be bowled again.", bowler),
        Delivery::Wicket { duck: true } => {
            format!("OUT! {} strikes and {} goes for a duck.", bowler, batsman)
        }
        Delivery::Wicket { duck: false } => format!("OUT! {} gets {}.", bowler, batsman),
        Delivery::Runs(0) => format!("{} to {}, no run.", bowler, batsman),
        Delivery::Runs(1) => format!("{} to {}, a single.", bowler, batsman),
        Delivery::Runs(n) => format!("{} to {}, {} runs.", bowler, batsman, n),
    }
}

/// A point on the worm chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormPoint {
    /// 1-based delivery number within the innings (extras included)
    pub delivery: u32,
    pub score: u32,
    pub wickets: u32,
}

/// Cumulative score after each delivery of `innings`.
pub fn worm(timeline: &[BallRecord], innings: u8) -> Vec<WormPoint> {
    timeline
        .iter()
        .filter(|b| b.innings == innings)
        .enumerate()
        .map(|(i, b)| WormPoint {
            delivery: i as u32 + 1,
            score: b.total_score,
            wickets: b.total_wickets,
        })
        .collect()
}

/// Runs per over of `innings`, indexed by over. Overs with no deliveries in
/// between are zero.
pub fn manhattan(timeline: &[BallRecord], innings: u8) -> Vec<u32> {
    let mut overs: Vec<u32> = Vec::new();
    for ball in timeline.iter().filter(|b| b.innings == innings) {
        let idx = ball.over as usize;
        if overs.len() <= idx {
            overs.resize(idx + 1, 0);
        }
        overs[idx] += ball.runs;
    }
    overs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(innings: u8, over: u32, runs: u32, total: u32) -> BallRecord {
        BallRecord {
            innings,
            team: if innings == 1 { TeamSide::A } else { TeamSide::B },
            over,
            ball: 1,
            runs,
            is_extra: false,
            is_wicket: false,
            is_boundary: false,
            total_score: total,
            total_wickets: 0,
            batsman_name: "Bat".into(),
            bowler_name: "Bowl".into(),
            commentary: String::new(),
        }
    }

    #[test]
    fn test_commentary_lines() {
        assert_eq!(
            commentary(Delivery::Boundary(BoundaryKind::Four), "Gill", "Wood"),
            "FOUR! Gill finds the fence off Wood."
        );
        assert_eq!(commentary(Delivery::Runs(0), "Gill", "Wood"), "Wood to Gill, no run.");
        assert_eq!(commentary(Delivery::Runs(2), "Gill", "Wood"), "Wood to Gill, 2 runs.");
        assert!(commentary(Delivery::Wicket { duck: true }, "Gill", "Wood").contains("duck"));
    }

    #[test]
    fn test_worm_is_cumulative_per_innings() {
        let timeline = vec![rec(1, 0, 1, 1), rec(1, 0, 4, 5), rec(2, 0, 6, 6)];
        let w = worm(&timeline, 1);
        assert_eq!(w.len(), 2);
        assert_eq!(w[1], WormPoint { delivery: 2, score: 5, wickets: 0 });
        assert_eq!(worm(&timeline, 2)[0].score, 6);
    }

    #[test]
    fn test_manhattan_groups_by_over() {
        let timeline = vec![rec(1, 0, 1, 1), rec(1, 0, 4, 5), rec(1, 2, 2, 7)];
        assert_eq!(manhattan(&timeline, 1), vec![5, 0, 2]);
        assert!(manhattan(&timeline, 2).is_empty());
    }
}
