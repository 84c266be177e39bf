//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the scorer.
//! All types are plain data (serde-derivable, no I/O), making them usable in
//! any context: the scoring state machine, terminal rendering, the live
//! broadcast protocol, and persisted match records.
//!
//! # Match Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BALLS_PER_OVER` | 6 | Legal deliveries in one over |
//! | `TEAM_SIZE` | 11 | Players in a roster |
//! | `MAX_WICKETS` | 10 | Wickets that end an innings (all out) |
//! | `DEFAULT_TOTAL_OVERS` | 2 | Overs per innings when not configured |
//! | `EXTRA_RUNS` | 1 | Runs added to the total for a wide or no-ball |
//! | `MAX_RUNS_PER_BALL` | 6 | Most runs a single legal delivery may score |
//!
//! # Man of the Match Weights
//!
//! - Batting: `runs + 2 x fours + 4 x sixes`
//! - Bowling: `25 x wickets - runs conceded`
//!
//! # Examples
//!
//! ```
//! use cricket_scorer_types::{format_overs, Role, ScoreCommand, TeamSide, BALLS_PER_OVER};
//!
//! let role = Role::from_str("all-rounder").unwrap();
//! assert!(role.can_bowl());
//!
//! assert_eq!(TeamSide::A.other(), TeamSide::B);
//! assert_eq!(format_overs(2 * BALLS_PER_OVER + 3), "2.3");
//!
//! let cmd = ScoreCommand::boundary(6);
//! assert_eq!(cmd.name(), "ball");
//! ```

use serde::{Deserialize, Serialize};

/// Legal deliveries in an over
pub const BALLS_PER_OVER: u32 = 6;

/// Players in a team roster
pub const TEAM_SIZE: usize = 11;

/// Wickets that end an innings
pub const MAX_WICKETS: u32 = 10;

/// Overs per innings when the scorer does not configure one
pub const DEFAULT_TOTAL_OVERS: u32 = 2;

/// Runs credited to the batting side for a wide or no-ball
pub const EXTRA_RUNS: u32 = 1;

/// Most runs a single legal delivery may score
pub const MAX_RUNS_PER_BALL: u32 = 6;

/// Contribution bonus per boundary four (on top of the four runs)
pub const FOUR_BONUS: i64 = 2;

/// Contribution bonus per six (on top of the six runs)
pub const SIX_BONUS: i64 = 4;

/// Contribution value of a single wicket
pub const WICKET_VALUE: i64 = 25;

/// Stable player identifier (unique within a team roster)
pub type PlayerId = u32;

/// Playing role of a squad member
///
/// - **Batsman**: bats only
/// - **Bowler**: eligible to bowl
/// - **AllRounder**: bats and is eligible to bowl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Batsman")]
    Batsman,
    #[serde(rename = "Bowler")]
    Bowler,
    #[serde(rename = "All-rounder", alias = "AllRounder")]
    AllRounder,
}

impl Role {
    /// Parse role from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use cricket_scorer_types::Role;
    ///
    /// assert_eq!(Role::from_str("bowler"), Some(Role::Bowler));
    /// assert_eq!(Role::from_str("All-Rounder"), Some(Role::AllRounder));
    /// assert_eq!(Role::from_str("umpire"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "batsman" | "bat" => Some(Role::Batsman),
            "bowler" | "bowl" => Some(Role::Bowler),
            "all-rounder" | "allrounder" | "all rounder" | "ar" => Some(Role::AllRounder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Batsman => "Batsman",
            Role::Bowler => "Bowler",
            Role::AllRounder => "All-rounder",
        }
    }

    /// Bowlers and all-rounders may bowl
    pub fn can_bowl(&self) -> bool {
        matches!(self, Role::Bowler | Role::AllRounder)
    }
}

/// A squad member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// A team: a name and its roster in batting order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            name: name.into(),
            players,
        }
    }

    /// Look up a roster member by id
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Roster members eligible to bowl, in roster order
    pub fn eligible_bowlers(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.role.can_bowl())
    }
}

/// Which of the two configured teams (A bats first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    /// The opposing side
    pub fn other(&self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::A => "A",
            TeamSide::B => "B",
        }
    }
}

/// Boundary classification of a delivery off the bat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    #[serde(rename = "four")]
    Four,
    #[serde(rename = "six")]
    Six,
}

impl BoundaryKind {
    /// Classify `runs` scored with the boundary flag set.
    ///
    /// Only 4 and 6 are boundaries; anything else is ordinary running.
    pub fn from_runs(runs: u32) -> Option<Self> {
        match runs {
            4 => Some(BoundaryKind::Four),
            6 => Some(BoundaryKind::Six),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::Four => "four",
            BoundaryKind::Six => "six",
        }
    }
}

/// One batsman's innings
///
/// The name is a snapshot of the roster name and can be edited during play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatsmanRecord {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    /// Legal balls faced
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_striker: bool,
    pub is_out: bool,
}

impl BatsmanRecord {
    /// Fresh, not-out record for `player`
    pub fn fresh(player: &Player, is_striker: bool) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            is_striker,
            is_out: false,
        }
    }

    /// Runs per 100 balls (0 before the first ball)
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        self.runs as f64 * 100.0 / self.balls as f64
    }

    /// Man-of-the-match batting contribution
    pub fn contribution(&self) -> i64 {
        self.runs as i64 + FOUR_BONUS * self.fours as i64 + SIX_BONUS * self.sixes as i64
    }
}

/// One bowler's spell figures
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BowlerRecord {
    pub id: PlayerId,
    pub name: String,
    /// Completed overs
    pub overs: u32,
    /// Legal balls in the current (incomplete) over, 0..=5
    pub balls: u32,
    /// Runs conceded (extras included)
    pub runs: u32,
    pub wickets: u32,
}

impl BowlerRecord {
    pub fn fresh(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            overs: 0,
            balls: 0,
            runs: 0,
            wickets: 0,
        }
    }

    /// Zero the figures, keeping identity
    pub fn reset(&mut self) {
        self.overs = 0;
        self.balls = 0;
        self.runs = 0;
        self.wickets = 0;
    }

    pub fn total_balls(&self) -> u32 {
        self.overs * BALLS_PER_OVER + self.balls
    }

    /// At least one legal ball bowled
    pub fn has_bowled(&self) -> bool {
        self.overs > 0 || self.balls > 0
    }

    pub fn overs_display(&self) -> String {
        format_overs(self.total_balls())
    }

    /// Runs conceded per six legal balls (0 before the first ball)
    pub fn economy(&self) -> f64 {
        let balls = self.total_balls();
        if balls == 0 {
            return 0.0;
        }
        self.runs as f64 * BALLS_PER_OVER as f64 / balls as f64
    }

    /// Man-of-the-match bowling contribution (may be negative)
    pub fn contribution(&self) -> i64 {
        WICKET_VALUE * self.wickets as i64 - self.runs as i64
    }
}

/// Scoring commands issued by the scorer
///
/// Starting a match carries full rosters and is a separate operation on the
/// state machine; everything else a scorer can do mid-match is here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScoreCommand {
    /// A delivery: runs off the bat, or a wide/no-ball when `is_extra`
    #[serde(rename_all = "camelCase")]
    Ball {
        runs: u32,
        #[serde(default)]
        is_extra: bool,
        #[serde(default)]
        is_boundary: bool,
    },
    /// Striker dismissed
    Wicket,
    /// Choose the bowler for the next over from the fielding roster
    #[serde(rename_all = "camelCase")]
    SelectBowler { player_id: PlayerId },
    /// Manually swap striker and non-striker
    ChangeStrike,
    /// Raise the bowler selection prompt
    NewOver,
    /// Abandon the match and return to setup
    Reset,
    /// Edit a player's display name in one team's roster
    #[serde(rename_all = "camelCase")]
    RenamePlayer {
        side: TeamSide,
        player_id: PlayerId,
        name: String,
    },
}

impl ScoreCommand {
    /// Legal delivery with `runs` run between the wickets
    pub fn runs(runs: u32) -> Self {
        ScoreCommand::Ball {
            runs,
            is_extra: false,
            is_boundary: false,
        }
    }

    /// Legal delivery that reached the rope (only 4 and 6 count as boundaries)
    pub fn boundary(runs: u32) -> Self {
        ScoreCommand::Ball {
            runs,
            is_extra: false,
            is_boundary: BoundaryKind::from_runs(runs).is_some(),
        }
    }

    /// Wide or no-ball
    pub fn extra() -> Self {
        ScoreCommand::Ball {
            runs: EXTRA_RUNS,
            is_extra: true,
            is_boundary: false,
        }
    }

    /// Parse a payload-free command by name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wicket" => Some(ScoreCommand::Wicket),
            "changestrike" => Some(ScoreCommand::ChangeStrike),
            "newover" => Some(ScoreCommand::NewOver),
            "reset" => Some(ScoreCommand::Reset),
            _ => None,
        }
    }

    /// camelCase name used on the wire and in logs
    pub fn name(&self) -> &'static str {
        match self {
            ScoreCommand::Ball { .. } => "ball",
            ScoreCommand::Wicket => "wicket",
            ScoreCommand::SelectBowler { .. } => "selectBowler",
            ScoreCommand::ChangeStrike => "changeStrike",
            ScoreCommand::NewOver => "newOver",
            ScoreCommand::Reset => "reset",
            ScoreCommand::RenamePlayer { .. } => "renamePlayer",
        }
    }
}

/// Format a legal-ball count as cricket overs notation (`"O.B"`)
///
/// # Examples
///
/// ```
/// use cricket_scorer_types::format_overs;
///
/// assert_eq!(format_overs(0), "0.0");
/// assert_eq!(format_overs(11), "1.5");
/// assert_eq!(format_overs(12), "2.0");
/// ```
pub fn format_overs(balls: u32) -> String {
    format!("{}.{}", balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
}
