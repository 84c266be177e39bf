//! End-to-end scoring scenarios and invariant sweeps over the state machine.

use cricket_scorer::core::{Applied, IgnoreReason, MatchState};
use cricket_scorer::types::{ScoreCommand, TeamSide};

fn started() -> MatchState {
    let mut m = MatchState::new();
    m.start().unwrap();
    m
}

fn play(m: &mut MatchState, cmds: &[ScoreCommand]) {
    for cmd in cmds {
        assert!(m.apply(cmd.clone()).is_accepted(), "rejected {cmd:?}");
    }
}

#[test]
fn twelve_singles_close_the_first_innings() {
    let mut m = started();
    for _ in 0..12 {
        m.apply(ScoreCommand::runs(1));
    }

    let first = m.innings1().expect("first innings frozen");
    assert_eq!(first.team_name, "Team A");
    assert_eq!((first.score, first.wickets, first.balls), (12, 0, 12));
    assert_eq!(m.target(), 13);
    assert_eq!(m.batting_side(), TeamSide::B);
    assert_eq!(m.innings(), 2);
    assert!(!m.ended());
}

#[test]
fn chase_wins_by_wickets() {
    let mut m = started();
    let six = ScoreCommand::boundary(6);
    let four = ScoreCommand::boundary(4);

    // 7 sixes, 2 fours and 3 wickets: 50/3 off 12 balls.
    play(
        &mut m,
        &[
            six.clone(),
            ScoreCommand::Wicket,
            six.clone(),
            six.clone(),
            four.clone(),
            six.clone(),
            ScoreCommand::Wicket,
            six.clone(),
            six.clone(),
            ScoreCommand::Wicket,
            four,
            six.clone(),
        ],
    );
    let first = m.innings1().unwrap();
    assert_eq!((first.score, first.wickets, first.balls), (50, 3, 12));
    assert_eq!(m.target(), 51);

    play(&mut m, &[ScoreCommand::SelectBowler { player_id: 8 }]);
    play(&mut m, &[ScoreCommand::Wicket, ScoreCommand::Wicket]);
    for _ in 0..8 {
        play(&mut m, &[six.clone()]);
    }
    assert!(!m.ended());
    assert_eq!(m.runs(), 48);

    let event = m.apply(six).event().cloned().unwrap();
    assert!(event.match_ended);
    assert!(m.ended());
    assert!(m.balls() < 12);

    let result = m.result().unwrap();
    assert_eq!(result.winner, TeamSide::B);
    assert_eq!(result.summary(), "Team B won by 8 wickets");
    assert_eq!(m.innings2().unwrap().score, 54);
}

#[test]
fn first_ball_duck_brings_in_number_three() {
    let mut m = started();
    let applied = m.apply(ScoreCommand::Wicket);
    let event = applied.event().unwrap();

    assert!(event.wicket);
    assert_eq!(event.duck.as_deref(), Some("Virat Kohli"));
    assert_eq!(m.wickets(), 1);

    let batsmen = m.batsmen(TeamSide::A);
    assert!(batsmen[0].is_out);
    assert_eq!(m.crease(), [2, 1]);
    assert_eq!(m.striker().unwrap().name, "Shubman Gill");
    assert!(!batsmen[1].is_striker);
}

#[test]
fn all_out_ends_the_innings_early() {
    let mut all_out = started();
    for i in 0..10 {
        let ev = all_out.apply(ScoreCommand::Wicket);
        assert_eq!(ev.event().unwrap().innings_ended, i == 9);
    }

    let first = all_out.innings1().unwrap();
    assert_eq!((first.score, first.wickets, first.balls), (0, 10, 10));
    assert_eq!(all_out.target(), 1);

    // Same downstream state as an innings that ran out of overs.
    let mut overs_done = started();
    for _ in 0..12 {
        overs_done.apply(ScoreCommand::runs(0));
    }
    for m in [&all_out, &overs_done] {
        assert_eq!(m.innings(), 2);
        assert_eq!(m.batting_side(), TeamSide::B);
        assert_eq!((m.runs(), m.wickets(), m.balls(), m.extras()), (0, 0, 0, 0));
        assert_eq!(m.crease(), [0, 1]);
        assert!(m.awaiting_bowler());
        assert_eq!(m.striker().unwrap().name, "Kane Williamson");
    }

    // Further wickets in the new innings belong to team B.
    all_out.apply(ScoreCommand::Wicket);
    assert_eq!(all_out.wickets(), 1);
    assert_eq!(all_out.innings1().unwrap().wickets, 10);
}

/// First innings of twelve singles: 12/0, target 13.
fn twelve_to_chase() -> MatchState {
    let mut m = started();
    for _ in 0..12 {
        m.apply(ScoreCommand::runs(1));
    }
    assert_eq!(m.target(), 13);
    m.apply(ScoreCommand::SelectBowler { player_id: 8 });
    m
}

#[test]
fn chase_can_be_won_by_an_extra() {
    let mut m = started();
    for _ in 0..12 {
        m.apply(ScoreCommand::runs(0));
    }
    assert_eq!(m.target(), 1);
    m.apply(ScoreCommand::SelectBowler { player_id: 8 });

    let event = m.apply(ScoreCommand::extra()).event().cloned().unwrap();
    assert!(event.match_ended);
    assert!(m.ended());

    let second = m.innings2().unwrap();
    assert_eq!((second.score, second.wickets, second.balls), (1, 0, 0));
    let result = m.result().unwrap();
    assert_eq!(result.winner, TeamSide::B);
    assert_eq!(result.summary(), "Team B won by 10 wickets");
}

#[test]
fn wicket_on_the_last_ball_closes_the_first_innings() {
    let mut m = started();
    for _ in 0..11 {
        m.apply(ScoreCommand::runs(1));
    }
    assert_eq!(m.innings(), 1);

    let event = m.apply(ScoreCommand::Wicket).event().cloned().unwrap();
    assert!(event.wicket);
    assert!(event.innings_ended);
    assert!(!event.match_ended);

    let first = m.innings1().unwrap();
    assert_eq!((first.score, first.wickets, first.balls), (11, 1, 12));
    assert_eq!(m.target(), 12);
    assert_eq!(m.innings(), 2);
    assert_eq!(m.batting_side(), TeamSide::B);
}

#[test]
fn chasing_side_all_out_loses_by_runs() {
    let mut m = twelve_to_chase();
    for i in 0..10 {
        let event = m.apply(ScoreCommand::Wicket).event().cloned().unwrap();
        assert_eq!(event.match_ended, i == 9);
    }

    assert!(m.ended());
    let second = m.innings2().unwrap();
    assert_eq!((second.score, second.wickets, second.balls), (0, 10, 10));
    let result = m.result().unwrap();
    assert_eq!(result.winner, TeamSide::A);
    assert_eq!(result.summary(), "Team A won by 12 runs");
}

#[test]
fn finishing_one_short_of_the_target_loses() {
    let mut m = twelve_to_chase();
    for _ in 0..11 {
        m.apply(ScoreCommand::runs(1));
    }
    assert!(!m.ended());
    assert_eq!(m.runs_needed(), Some(2));

    let event = m.apply(ScoreCommand::runs(1)).event().cloned().unwrap();
    assert!(event.match_ended);

    let second = m.innings2().unwrap();
    assert_eq!((second.score, second.balls), (12, 12));
    let result = m.result().unwrap();
    assert_eq!(result.winner, TeamSide::A);
    assert_eq!(result.summary(), "Team A won by 0 runs");
}

#[test]
fn man_of_match_tie_goes_to_the_earlier_player() {
    let mut m = started();
    // Kohli: six (6 + 4 bonus = 10), then dots to the end of the innings.
    m.apply(ScoreCommand::boundary(6));
    for _ in 0..11 {
        m.apply(ScoreCommand::runs(0));
    }
    assert_eq!(m.target(), 7);

    // Williamson matches with a six; Babar finishes the chase with a single.
    m.apply(ScoreCommand::boundary(6));
    m.apply(ScoreCommand::ChangeStrike);
    m.apply(ScoreCommand::runs(1));
    assert!(m.ended());
    assert_eq!(m.winner(), Some(TeamSide::B));
    assert_eq!(m.man_of_match(), Some("Virat Kohli"));
}

#[test]
fn select_bowler_twice_is_idempotent() {
    let mut m = started();
    for _ in 0..6 {
        m.apply(ScoreCommand::runs(0));
    }
    assert!(m.awaiting_bowler());

    m.apply(ScoreCommand::SelectBowler { player_id: 19 });
    let once = m.snapshot();
    m.apply(ScoreCommand::SelectBowler { player_id: 19 });
    assert_eq!(m.snapshot(), once);
    assert_eq!(m.current_bowler().unwrap().name, "Jofra Archer");
}

#[test]
fn commands_after_the_end_change_nothing() {
    let mut m = started();
    for _ in 0..24 {
        m.apply(ScoreCommand::runs(0));
    }
    assert!(m.ended());
    let before = m.snapshot();
    assert_eq!(m.apply(ScoreCommand::Wicket), Applied::Ignored(IgnoreReason::Ended));
    assert_eq!(m.apply(ScoreCommand::extra()), Applied::Ignored(IgnoreReason::Ended));
    assert_eq!(m.snapshot(), before);
    // Level scores: the defending side wins.
    assert_eq!(m.result().unwrap().summary(), "Team A won by 0 runs");
}

/// Small xorshift so sweeps are reproducible without extra dependencies.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_command(rng: &mut Rng, m: &MatchState) -> ScoreCommand {
    match rng.below(20) {
        0..=9 => ScoreCommand::runs(rng.below(4) as u32),
        10 => ScoreCommand::boundary(4),
        11 => ScoreCommand::boundary(6),
        12 | 13 => ScoreCommand::extra(),
        14 | 15 => ScoreCommand::Wicket,
        16 => ScoreCommand::ChangeStrike,
        _ => {
            let fielding = m.team(m.fielding_side());
            let pick = rng.below(fielding.players.len() as u64) as usize;
            ScoreCommand::SelectBowler {
                player_id: fielding.players[pick].id,
            }
        }
    }
}

fn check_invariants(m: &MatchState) {
    if m.ended() {
        return;
    }
    let batting = m.batting_side();
    let batsmen = m.batsmen(batting);
    let bowlers = m.bowlers(batting.other());

    let bat_runs: u32 = batsmen.iter().map(|b| b.runs).sum();
    assert_eq!(bat_runs + m.extras(), m.runs(), "runs off the bat plus extras");

    let bowled: u32 = bowlers.iter().map(|b| b.total_balls()).sum();
    assert_eq!(bowled, m.balls(), "legal balls match the bowlers' tallies");

    let faced: u32 = batsmen.iter().map(|b| b.balls).sum();
    assert_eq!(faced, m.balls(), "extras are never faced");

    let strikers = m
        .crease()
        .iter()
        .filter(|&&i| batsmen[i].is_striker && !batsmen[i].is_out)
        .count();
    assert_eq!(strikers, 1, "exactly one striker at the crease");

    for b in bowlers {
        assert!(b.balls < 6, "{} has an unfinished over of {} balls", b.name, b.balls);
    }
}

#[test]
fn invariants_hold_across_random_matches() {
    for seed in 1..=40u64 {
        let mut rng = Rng(seed * 0x9E37_79B9_7F4A_7C15);
        let mut m = started();
        let mut steps = 0;
        while !m.ended() && steps < 500 {
            let cmd = random_command(&mut rng, &m);
            m.apply(cmd);
            check_invariants(&m);
            steps += 1;
        }
        assert!(m.ended(), "seed {seed} did not finish");

        let first = m.innings1().unwrap();
        let second = m.innings2().unwrap();
        assert!(first.balls <= 12 && second.balls <= 12);
        assert_eq!(second.target, Some(first.score + 1));
        assert!(m.man_of_match().is_some());
    }
}

#[test]
fn extras_touch_only_the_team_total() {
    let mut m = started();
    m.apply(ScoreCommand::runs(2));
    let striker_balls = m.striker().unwrap().balls;
    let bowler_balls = m.current_bowler().unwrap().total_balls();

    for _ in 0..3 {
        let ev = m.apply(ScoreCommand::extra());
        assert_eq!(ev.event().unwrap().runs, 1);
    }
    assert_eq!(m.runs(), 5);
    assert_eq!(m.extras(), 3);
    assert_eq!(m.balls(), 1);
    assert_eq!(m.striker().unwrap().balls, striker_balls);
    assert_eq!(m.current_bowler().unwrap().total_balls(), bowler_balls);
    // The bowler still concedes them.
    assert_eq!(m.current_bowler().unwrap().runs, 5);
}
