//! Match state module - the ball-by-ball scoring state machine
//!
//! [`MatchState`] owns one two-innings limited-overs match: rosters, both
//! sides' batting and bowling records, the live running score, the batsmen at
//! the crease and the current bowler. Every scoring command is applied as a
//! single synchronous transition via [`MatchState::apply`]; a command that is
//! not valid in the current state is reported as [`Applied::Ignored`] and
//! leaves the state untouched.
//!
//! # Transitions
//!
//! | Trigger | Effect |
//! |---------|--------|
//! | 6th legal ball of a spell | over completes, strike rotates, bowler selection requested |
//! | Innings 1 balls reach `total_overs x 6`, or all out | innings 1 frozen, target set, sides swap |
//! | Innings 2 reaches target, balls run out, or all out | innings 2 frozen, winner and man of the match decided |
//!
//! Team A always bats first.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use cricket_scorer_types::{
    BatsmanRecord, BoundaryKind, BowlerRecord, ScoreCommand, Team, TeamSide, BALLS_PER_OVER,
    DEFAULT_TOTAL_OVERS, EXTRA_RUNS, MAX_RUNS_PER_BALL, MAX_WICKETS,
};

use crate::roster::{default_team_a, default_team_b, validate_team};
use crate::scoring::{man_of_match, MatchResult};
use crate::snapshot::MatchSnapshot;
use crate::timeline::{commentary, BallRecord, Delivery};
use crate::{InningsSnapshot, MatchSetupError};

/// Why a command was dropped without changing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotStarted,
    Ended,
    /// Ten wickets already down
    AllOut,
    /// No active batsman holds the strike. Never happens in a correctly
    /// sequenced match.
    MissingStriker,
    /// A delivery was recorded before any bowler was chosen
    NoBowler,
    /// More runs off one legal delivery than `MAX_RUNS_PER_BALL`
    RunsOutOfRange,
    /// Player id is not in the relevant roster
    UnknownPlayer,
    EmptyName,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NotStarted => "match not started",
            IgnoreReason::Ended => "match already ended",
            IgnoreReason::AllOut => "batting side all out",
            IgnoreReason::MissingStriker => "no striker at the crease",
            IgnoreReason::NoBowler => "no bowler selected",
            IgnoreReason::RunsOutOfRange => "too many runs for one ball",
            IgnoreReason::UnknownPlayer => "unknown player",
            IgnoreReason::EmptyName => "player name is empty",
        }
    }
}

/// Signals raised by one accepted transition (consumed by the scoreboard and
/// observers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Runs added to the batting total
    pub runs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryKind>,
    pub wicket: bool,
    /// Name of a batsman dismissed without scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duck: Option<String>,
    pub over_completed: bool,
    pub bowler_selection_required: bool,
    pub innings_ended: bool,
    pub match_ended: bool,
}

/// Outcome of [`MatchState::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Accepted(ScoreEvent),
    Ignored(IgnoreReason),
}

impl Applied {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Applied::Accepted(_))
    }

    pub fn event(&self) -> Option<&ScoreEvent> {
        match self {
            Applied::Accepted(ev) => Some(ev),
            Applied::Ignored(_) => None,
        }
    }
}

/// Complete match state
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    started: bool,
    /// 1 or 2
    innings: u8,
    team_a: Team,
    team_b: Team,
    innings1: Option<InningsSnapshot>,
    innings2: Option<InningsSnapshot>,
    batting: TeamSide,
    runs: u32,
    wickets: u32,
    /// Legal balls in the current innings
    balls: u32,
    extras: u32,
    /// Indices into the batting side's batsman records
    crease: [usize; 2],
    batsmen_a: Vec<BatsmanRecord>,
    batsmen_b: Vec<BatsmanRecord>,
    bowlers_a: Vec<BowlerRecord>,
    bowlers_b: Vec<BowlerRecord>,
    /// Index into the fielding side's bowler records
    bowler_index: usize,
    target: u32,
    ended: bool,
    winner: Option<TeamSide>,
    man_of_match: Option<String>,
    total_overs: u32,
    awaiting_bowler: bool,
    timeline: Vec<BallRecord>,
    /// Last accepted transition (consumed by observers).
    last_event: Option<ScoreEvent>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Not-started match with the default squads and overs
    pub fn new() -> Self {
        Self::blank(default_team_a(), default_team_b(), DEFAULT_TOTAL_OVERS)
    }

    fn blank(team_a: Team, team_b: Team, total_overs: u32) -> Self {
        Self {
            started: false,
            innings: 1,
            team_a,
            team_b,
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
            total_overs,
            awaiting_bowler: false,
            timeline: Vec::new(),
            last_event: None,
        }
    }

    /// Configure and start a match. Any match in progress is discarded.
    ///
    /// Batsman records are created for both squads in roster order (index 0
    /// on strike), and bowler records for every bowler and all-rounder. The
    /// first of those opens the bowling; if the fielding side has none, a
    /// bowler must be selected before the first ball.
    pub fn start_match(
        &mut self,
        team_a: Team,
        team_b: Team,
        total_overs: u32,
    ) -> Result<(), MatchSetupError> {
        validate_team(&team_a)?;
        validate_team(&team_b)?;
        if total_overs == 0 {
            return Err(MatchSetupError::NoOvers);
        }

        *self = Self::blank(team_a, team_b, total_overs);
        self.started = true;
        self.batsmen_a = fresh_batsmen(&self.team_a);
        self.batsmen_b = fresh_batsmen(&self.team_b);
        self.bowlers_a = fresh_bowlers(&self.team_a);
        self.bowlers_b = fresh_bowlers(&self.team_b);
        self.awaiting_bowler = self.current_bowler().is_none();

        info!(
            team_a = %self.team_a.name,
            team_b = %self.team_b.name,
            total_overs,
            "match started"
        );
        Ok(())
    }

    /// Start with the rosters and overs already configured
    pub fn start(&mut self) -> Result<(), MatchSetupError> {
        let (a, b) = (self.team_a.clone(), self.team_b.clone());
        self.start_match(a, b, self.total_overs)
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn innings(&self) -> u8 {
        self.innings
    }

    pub fn batting_side(&self) -> TeamSide {
        self.batting
    }

    pub fn fielding_side(&self) -> TeamSide {
        self.batting.other()
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn wickets(&self) -> u32 {
        self.wickets
    }

    pub fn balls(&self) -> u32 {
        self.balls
    }

    pub fn extras(&self) -> u32 {
        self.extras
    }

    /// Runs the chasing side needs (0 during innings 1)
    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn total_overs(&self) -> u32 {
        self.total_overs
    }

    pub fn awaiting_bowler(&self) -> bool {
        self.awaiting_bowler
    }

    pub fn crease(&self) -> [usize; 2] {
        self.crease
    }

    pub fn bowler_index(&self) -> usize {
        self.bowler_index
    }

    pub fn innings1(&self) -> Option<&InningsSnapshot> {
        self.innings1.as_ref()
    }

    pub fn innings2(&self) -> Option<&InningsSnapshot> {
        self.innings2.as_ref()
    }

    pub fn winner(&self) -> Option<TeamSide> {
        self.winner
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|side| self.team(side).name.as_str())
    }

    pub fn man_of_match(&self) -> Option<&str> {
        self.man_of_match.as_deref()
    }

    pub fn timeline(&self) -> &[BallRecord] {
        &self.timeline
    }

    pub fn batsmen(&self, side: TeamSide) -> &[BatsmanRecord] {
        match side {
            TeamSide::A => &self.batsmen_a,
            TeamSide::B => &self.batsmen_b,
        }
    }

    pub fn bowlers(&self, side: TeamSide) -> &[BowlerRecord] {
        match side {
            TeamSide::A => &self.bowlers_a,
            TeamSide::B => &self.bowlers_b,
        }
    }

    /// Batsmen at the crease, in slot order
    pub fn current_batsmen(&self) -> Vec<&BatsmanRecord> {
        let batsmen = self.batsmen(self.batting);
        self.crease.iter().filter_map(|&i| batsmen.get(i)).collect()
    }

    pub fn striker(&self) -> Option<&BatsmanRecord> {
        self.striker_slot()
            .and_then(|slot| self.batsmen(self.batting).get(self.crease[slot]))
    }

    pub fn current_bowler(&self) -> Option<&BowlerRecord> {
        self.bowlers(self.fielding_side()).get(self.bowler_index)
    }

    /// Result once the match has ended
    pub fn result(&self) -> Option<MatchResult> {
        match (&self.innings1, &self.innings2) {
            (Some(first), Some(second)) if self.ended => Some(MatchResult::decide(first, second)),
            _ => None,
        }
    }

    pub fn legal_ball_limit(&self) -> u32 {
        self.total_overs.saturating_mul(BALLS_PER_OVER)
    }

    pub fn balls_remaining(&self) -> u32 {
        self.legal_ball_limit().saturating_sub(self.balls)
    }

    /// Runs per over in the current innings
    pub fn current_run_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        self.runs as f64 * BALLS_PER_OVER as f64 / self.balls as f64
    }

    /// Runs still needed, while chasing
    pub fn runs_needed(&self) -> Option<u32> {
        if self.innings == 2 && self.started && !self.ended {
            Some(self.target.saturating_sub(self.runs))
        } else {
            None
        }
    }

    /// Runs per over needed from the remaining balls, while chasing
    pub fn required_run_rate(&self) -> Option<f64> {
        let needed = self.runs_needed()?;
        let remaining = self.balls_remaining();
        if remaining == 0 {
            return None;
        }
        Some(needed as f64 * BALLS_PER_OVER as f64 / remaining as f64)
    }

    pub fn take_last_event(&mut self) -> Option<ScoreEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut MatchSnapshot) {
        out.started = self.started;
        out.innings = self.innings;
        out.team_a.clone_from(&self.team_a);
        out.team_b.clone_from(&self.team_b);
        out.innings1.clone_from(&self.innings1);
        out.innings2.clone_from(&self.innings2);
        out.batting = self.batting;
        out.runs = self.runs;
        out.wickets = self.wickets;
        out.balls = self.balls;
        out.extras = self.extras;
        out.crease = self.crease;
        out.batsmen_a.clone_from(&self.batsmen_a);
        out.batsmen_b.clone_from(&self.batsmen_b);
        out.bowlers_a.clone_from(&self.bowlers_a);
        out.bowlers_b.clone_from(&self.bowlers_b);
        out.bowler_index = self.bowler_index;
        out.target = self.target;
        out.ended = self.ended;
        out.winner = self.winner_name().map(str::to_string);
        out.man_of_match.clone_from(&self.man_of_match);
        out.total_overs = self.total_overs;
        out.awaiting_bowler = self.awaiting_bowler;
        out.result_summary = self.result().map(|r| r.summary());
        out.last_ball = self.timeline.last().cloned();
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let mut snap = MatchSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Apply one scoring command
    pub fn apply(&mut self, command: ScoreCommand) -> Applied {
        let name = command.name();
        let applied = match command {
            ScoreCommand::Ball {
                runs,
                is_extra,
                is_boundary,
            } => self.record_ball(runs, is_extra, is_boundary),
            ScoreCommand::Wicket => self.record_wicket(),
            ScoreCommand::SelectBowler { player_id } => self.select_bowler(player_id),
            ScoreCommand::ChangeStrike => self.change_strike(),
            ScoreCommand::NewOver => self.new_over(),
            ScoreCommand::Reset => self.reset(),
            ScoreCommand::RenamePlayer {
                side,
                player_id,
                name,
            } => self.rename_player(side, player_id, &name),
        };

        match &applied {
            Applied::Accepted(event) => {
                debug!(
                    command = name,
                    innings = self.innings,
                    runs = self.runs,
                    wickets = self.wickets,
                    balls = self.balls,
                    "transition applied"
                );
                self.last_event = Some(event.clone());
            }
            Applied::Ignored(reason) => {
                debug!(command = name, reason = reason.as_str(), "command ignored");
            }
        }
        applied
    }

    /// Record a delivery. An extra scores exactly one run and is re-bowled.
    pub fn record_ball(&mut self, runs: u32, is_extra: bool, is_boundary: bool) -> Applied {
        if let Some(reason) = self.scoring_guard() {
            return Applied::Ignored(reason);
        }
        if !is_extra && runs > MAX_RUNS_PER_BALL {
            return Applied::Ignored(IgnoreReason::RunsOutOfRange);
        }
        let Some(slot) = self.striker_slot() else {
            return self.missing_striker();
        };
        if self.current_bowler().is_none() {
            return Applied::Ignored(IgnoreReason::NoBowler);
        }

        let crease = self.crease;
        let bowler_index = self.bowler_index;
        let legal_before = self.balls;
        let mut event = ScoreEvent::default();

        let (batsmen, bowlers) = self.innings_records();
        let striker_idx = crease[slot];
        let batsman_name = batsmen[striker_idx].name.clone();
        let bowler = &mut bowlers[bowler_index];
        let bowler_name = bowler.name.clone();

        let delivery = if is_extra {
            bowler.runs = bowler.runs.saturating_add(EXTRA_RUNS);
            event.runs = EXTRA_RUNS;
            Delivery::Extra
        } else {
            let boundary = if is_boundary {
                BoundaryKind::from_runs(runs)
            } else {
                None
            };
            let striker = &mut batsmen[striker_idx];
            striker.runs = striker.runs.saturating_add(runs);
            striker.balls += 1;
            match boundary {
                Some(BoundaryKind::Four) => striker.fours += 1,
                Some(BoundaryKind::Six) => striker.sixes += 1,
                None => {}
            }

            bowler.runs = bowler.runs.saturating_add(runs);
            bowler.balls += 1;
            event.runs = runs;
            event.boundary = boundary;

            if runs % 2 == 1 {
                rotate_strike(batsmen, crease);
            }
            if bowler.balls == BALLS_PER_OVER {
                bowler.overs += 1;
                bowler.balls = 0;
                rotate_strike(batsmen, crease);
                event.over_completed = true;
            }
            boundary.map_or(Delivery::Runs(runs), Delivery::Boundary)
        };

        if is_extra {
            self.runs = self.runs.saturating_add(EXTRA_RUNS);
            self.extras += 1;
        } else {
            self.runs = self.runs.saturating_add(runs);
            self.balls += 1;
        }
        if event.over_completed {
            self.awaiting_bowler = true;
            event.bowler_selection_required = true;
        }

        self.push_ball(legal_before, !is_extra, &event, delivery, batsman_name, bowler_name);
        self.check_innings_end(false, &mut event);
        Applied::Accepted(event)
    }

    /// Dismiss the striker. The dismissal uses up a legal ball when a bowler
    /// is on; the next batsman in roster order walks in on strike.
    pub fn record_wicket(&mut self) -> Applied {
        if let Some(reason) = self.scoring_guard() {
            return Applied::Ignored(reason);
        }
        if self.wickets >= MAX_WICKETS {
            return Applied::Ignored(IgnoreReason::AllOut);
        }
        let Some(slot) = self.striker_slot() else {
            return self.missing_striker();
        };

        let crease = self.crease;
        let bowler_index = self.bowler_index;
        let legal_before = self.balls;
        let mut event = ScoreEvent {
            wicket: true,
            ..ScoreEvent::default()
        };

        let (batsmen, bowlers) = self.innings_records();
        let out_idx = crease[slot];
        let batsman_name = batsmen[out_idx].name.clone();
        let duck = batsmen[out_idx].runs == 0;
        batsmen[out_idx].is_out = true;
        batsmen[out_idx].is_striker = false;

        let mut bowler_name = String::new();
        let ball_counted = match bowlers.get_mut(bowler_index) {
            Some(bowler) => {
                bowler.wickets += 1;
                bowler.balls += 1;
                if bowler.balls == BALLS_PER_OVER {
                    bowler.overs += 1;
                    bowler.balls = 0;
                    event.over_completed = true;
                }
                bowler_name = bowler.name.clone();
                batsmen[out_idx].balls += 1;
                true
            }
            None => false,
        };

        let next = batsmen
            .iter()
            .enumerate()
            .position(|(i, b)| !b.is_out && !crease.contains(&i));
        let mut new_crease = crease;
        if let Some(i) = next {
            batsmen[i].is_striker = true;
            new_crease[slot] = i;
        }
        if event.over_completed {
            rotate_strike(batsmen, new_crease);
        }

        self.crease = new_crease;
        self.wickets += 1;
        if ball_counted {
            self.balls += 1;
        }
        if duck {
            event.duck = Some(batsman_name.clone());
        }
        if event.over_completed {
            self.awaiting_bowler = true;
            event.bowler_selection_required = true;
        }

        self.push_ball(
            legal_before,
            ball_counted,
            &event,
            Delivery::Wicket { duck },
            batsman_name,
            bowler_name,
        );
        let all_out = next.is_none();
        self.check_innings_end(all_out, &mut event);
        Applied::Accepted(event)
    }

    /// Put a fielding-side player on to bowl, creating their record on first use.
    pub fn select_bowler(&mut self, player_id: u32) -> Applied {
        if let Some(reason) = self.scoring_guard() {
            return Applied::Ignored(reason);
        }
        let fielding = self.fielding_side();
        let Some(player) = self.team(fielding).player(player_id).cloned() else {
            return Applied::Ignored(IgnoreReason::UnknownPlayer);
        };

        let bowlers = self.bowlers_mut(fielding);
        let index = match bowlers.iter().position(|b| b.id == player_id) {
            Some(i) => i,
            None => {
                bowlers.push(BowlerRecord::fresh(&player));
                bowlers.len() - 1
            }
        };
        self.bowler_index = index;
        self.awaiting_bowler = false;
        debug!(bowler = %player.name, index, "bowler selected");
        Applied::Accepted(ScoreEvent::default())
    }

    /// Swap the striker flag on both batsmen at the crease
    pub fn change_strike(&mut self) -> Applied {
        if let Some(reason) = self.scoring_guard() {
            return Applied::Ignored(reason);
        }
        let crease = self.crease;
        let side = self.batting;
        let batsmen = self.batsmen_mut(side);
        for i in crease {
            if let Some(b) = batsmen.get_mut(i) {
                b.is_striker = !b.is_striker;
            }
        }
        Applied::Accepted(ScoreEvent::default())
    }

    /// Ask for a bowler for the next over
    pub fn new_over(&mut self) -> Applied {
        if let Some(reason) = self.scoring_guard() {
            return Applied::Ignored(reason);
        }
        self.awaiting_bowler = true;
        Applied::Accepted(ScoreEvent {
            bowler_selection_required: true,
            ..ScoreEvent::default()
        })
    }

    /// Back to setup. Rosters and overs survive.
    pub fn reset(&mut self) -> Applied {
        *self = Self::blank(self.team_a.clone(), self.team_b.clone(), self.total_overs);
        info!("match reset");
        Applied::Accepted(ScoreEvent::default())
    }

    /// Rename a player of one side in the roster and that side's live
    /// records. Frozen innings keep the old name.
    pub fn rename_player(&mut self, side: TeamSide, player_id: u32, name: &str) -> Applied {
        let name = name.trim();
        if name.is_empty() {
            return Applied::Ignored(IgnoreReason::EmptyName);
        }

        let team = match side {
            TeamSide::A => &mut self.team_a,
            TeamSide::B => &mut self.team_b,
        };
        let Some(player) = team.player_mut(player_id) else {
            return Applied::Ignored(IgnoreReason::UnknownPlayer);
        };
        player.name = name.to_string();

        for b in self.batsmen_mut(side).iter_mut().filter(|b| b.id == player_id) {
            b.name = name.to_string();
        }
        for b in self.bowlers_mut(side).iter_mut().filter(|b| b.id == player_id) {
            b.name = name.to_string();
        }
        Applied::Accepted(ScoreEvent::default())
    }

    fn scoring_guard(&self) -> Option<IgnoreReason> {
        if !self.started {
            Some(IgnoreReason::NotStarted)
        } else if self.ended {
            Some(IgnoreReason::Ended)
        } else {
            None
        }
    }

    /// Crease slot (0 or 1) holding the striker
    fn striker_slot(&self) -> Option<usize> {
        let batsmen = self.batsmen(self.batting);
        self.crease
            .iter()
            .position(|&i| batsmen.get(i).is_some_and(|b| b.is_striker && !b.is_out))
    }

    fn missing_striker(&self) -> Applied {
        error!(
            innings = self.innings,
            crease = ?self.crease,
            "no striker among the batsmen at the crease, command dropped"
        );
        Applied::Ignored(IgnoreReason::MissingStriker)
    }

    fn batsmen_mut(&mut self, side: TeamSide) -> &mut Vec<BatsmanRecord> {
        match side {
            TeamSide::A => &mut self.batsmen_a,
            TeamSide::B => &mut self.batsmen_b,
        }
    }

    fn bowlers_mut(&mut self, side: TeamSide) -> &mut Vec<BowlerRecord> {
        match side {
            TeamSide::A => &mut self.bowlers_a,
            TeamSide::B => &mut self.bowlers_b,
        }
    }

    /// Batting side's batsmen and fielding side's bowlers
    fn innings_records(&mut self) -> (&mut Vec<BatsmanRecord>, &mut Vec<BowlerRecord>) {
        match self.batting {
            TeamSide::A => (&mut self.batsmen_a, &mut self.bowlers_b),
            TeamSide::B => (&mut self.batsmen_b, &mut self.bowlers_a),
        }
    }

    fn push_ball(
        &mut self,
        legal_before: u32,
        legal: bool,
        event: &ScoreEvent,
        delivery: Delivery,
        batsman_name: String,
        bowler_name: String,
    ) {
        let in_over = legal_before % BALLS_PER_OVER;
        let bowler_label = if bowler_name.is_empty() {
            "the bowler"
        } else {
            bowler_name.as_str()
        };
        let text = commentary(delivery, &batsman_name, bowler_label);
        self.timeline.push(BallRecord {
            innings: self.innings,
            team: self.batting,
            over: legal_before / BALLS_PER_OVER,
            ball: if legal { in_over + 1 } else { in_over },
            runs: event.runs,
            is_extra: matches!(delivery, Delivery::Extra),
            is_wicket: event.wicket,
            is_boundary: event.boundary.is_some(),
            total_score: self.runs,
            total_wickets: self.wickets,
            batsman_name,
            bowler_name,
            commentary: text,
        });
    }

    fn check_innings_end(&mut self, all_out: bool, event: &mut ScoreEvent) {
        let exhausted = self.balls >= self.legal_ball_limit();
        let all_out = all_out || self.wickets >= MAX_WICKETS;

        if self.innings == 1 {
            if exhausted || all_out {
                self.end_first_innings();
                event.innings_ended = true;
                event.bowler_selection_required = true;
            }
        } else if self.runs >= self.target || exhausted || all_out {
            self.end_match();
            event.innings_ended = true;
            event.match_ended = true;
            event.bowler_selection_required = false;
        }
    }

    fn end_first_innings(&mut self) {
        let first = self.batting;
        let second = first.other();
        let snapshot = InningsSnapshot::freeze(
            &self.team(first).name,
            self.runs,
            self.wickets,
            self.balls,
            self.extras,
            self.batsmen(first),
            self.bowlers(second),
            None,
        );
        info!(
            team = %snapshot.team_name,
            score = snapshot.score,
            wickets = snapshot.wickets,
            overs = %snapshot.overs_display(),
            "first innings complete"
        );

        self.target = self.runs.saturating_add(1);
        self.innings1 = Some(snapshot);
        self.innings = 2;
        self.batting = second;
        self.runs = 0;
        self.wickets = 0;
        self.balls = 0;
        self.extras = 0;
        self.crease = [0, 1];
        self.bowler_index = 0;
        self.awaiting_bowler = true;

        for (i, b) in self.batsmen_mut(second).iter_mut().enumerate() {
            b.runs = 0;
            b.balls = 0;
            b.fours = 0;
            b.sixes = 0;
            b.is_striker = i == 0;
            b.is_out = false;
        }
        for b in self.bowlers_mut(first).iter_mut() {
            b.reset();
        }
    }

    fn end_match(&mut self) {
        let chasing = self.batting;
        let snapshot = InningsSnapshot::freeze(
            &self.team(chasing).name,
            self.runs,
            self.wickets,
            self.balls,
            self.extras,
            self.batsmen(chasing),
            self.bowlers(chasing.other()),
            Some(self.target),
        );
        self.innings2 = Some(snapshot);
        self.ended = true;
        self.awaiting_bowler = false;
        self.winner = Some(if self.runs >= self.target {
            chasing
        } else {
            chasing.other()
        });
        self.man_of_match = man_of_match(
            &self.batsmen_a,
            &self.batsmen_b,
            &self.bowlers_a,
            &self.bowlers_b,
        );

        info!(
            winner = self.winner_name().unwrap_or_default(),
            result = %self.result().map(|r| r.summary()).unwrap_or_default(),
            man_of_match = self.man_of_match.as_deref().unwrap_or_default(),
            "match ended"
        );
    }
}

fn fresh_batsmen(team: &Team) -> Vec<BatsmanRecord> {
    team.players
        .iter()
        .enumerate()
        .map(|(i, p)| BatsmanRecord::fresh(p, i == 0))
        .collect()
}

fn fresh_bowlers(team: &Team) -> Vec<BowlerRecord> {
    team.eligible_bowlers().map(BowlerRecord::fresh).collect()
}

/// Swap strike between the two batsmen at the crease. Nothing happens unless
/// both slots hold a batsman who is not out.
fn rotate_strike(batsmen: &mut [BatsmanRecord], crease: [usize; 2]) -> bool {
    let [a, b] = crease;
    if a == b || a >= batsmen.len() || b >= batsmen.len() {
        return false;
    }
    if batsmen[a].is_out || batsmen[b].is_out {
        return false;
    }
    batsmen[a].is_striker = !batsmen[a].is_striker;
    batsmen[b].is_striker = !batsmen[b].is_striker;
    true
}
