//! Key mapping from terminal events to scoring commands.

use crate::core::MatchSnapshot;
use crate::types::ScoreCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys used to pick from the bowler list, in display order.
pub const BOWLER_KEYS: [char; 11] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Deliveries, wickets, strike changes
    Scoring,
    /// Letters pick the next bowler
    SelectBowler,
}

/// Which key layout is active for this state.
pub fn input_mode(snapshot: &MatchSnapshot) -> InputMode {
    if snapshot.live() && snapshot.awaiting_bowler {
        InputMode::SelectBowler
    } else {
        InputMode::Scoring
    }
}

/// Label shown next to the `index`-th bowler choice.
pub fn bowler_key(index: usize) -> Option<char> {
    BOWLER_KEYS.get(index).copied()
}

/// Map keyboard input to a scoring command for the current state.
pub fn handle_key_event(key: KeyEvent, snapshot: &MatchSnapshot) -> Option<ScoreCommand> {
    // Reset is available everywhere and deliberately needs the capital letter.
    if key.code == KeyCode::Char('R') {
        return Some(ScoreCommand::Reset);
    }

    match input_mode(snapshot) {
        InputMode::SelectBowler => select_bowler_key(key, snapshot),
        InputMode::Scoring => scoring_key(key),
    }
}

fn select_bowler_key(key: KeyEvent, snapshot: &MatchSnapshot) -> Option<ScoreCommand> {
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let c = c.to_ascii_lowercase();
    let index = BOWLER_KEYS.iter().position(|&k| k == c)?;
    let player = snapshot.bowler_choices().get(index).copied()?;
    Some(ScoreCommand::SelectBowler {
        player_id: player.id,
    })
}

fn scoring_key(key: KeyEvent) -> Option<ScoreCommand> {
    match key.code {
        // Runs off the bat
        KeyCode::Char(c @ ('0' | '1' | '2' | '3' | '5')) => {
            c.to_digit(10).map(ScoreCommand::runs)
        }
        // Boundaries
        KeyCode::Char(c @ ('4' | '6')) => c.to_digit(10).map(ScoreCommand::boundary),

        // Wide / no-ball
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('n') | KeyCode::Char('N') => {
            Some(ScoreCommand::extra())
        }

        KeyCode::Char('x') | KeyCode::Char('X') => Some(ScoreCommand::Wicket),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(ScoreCommand::ChangeStrike),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(ScoreCommand::NewOver),

        _ => None,
    }
}

/// Enter starts a match that is not running (a finished one starts afresh).
pub fn is_start_key(key: KeyEvent) -> bool {
    key.code == KeyCode::Enter
}

/// Check if key should quit the scorer.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
