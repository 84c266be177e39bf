//! ScoreboardView: maps a [`MatchSnapshot`] into a terminal framebuffer.
//!
//! Pure (no I/O). Scorer and viewer render through the same view, so what a
//! viewer sees is exactly what the scorer sees.

use crate::core::MatchSnapshot;
use crate::fb::{FrameBuffer, Rgb, Style};
use crate::input::{bowler_key, input_mode, InputMode};
use crate::types::BatsmanRecord;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Who is looking at the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewRole {
    #[default]
    Scorer,
    /// Read-only; key help is hidden
    Viewer,
}

/// Footer contents that do not come from the match itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusView {
    pub role: ViewRole,
    /// Live channel address, or the scorer being watched
    pub channel: Option<String>,
    /// One-line message (persistence failure, connection lost, ...)
    pub notice: Option<String>,
}

const TITLE: Style = Style::fg(Rgb::new(250, 210, 90)).bold();
const LABEL: Style = Style::fg(Rgb::new(140, 140, 160));
const VALUE: Style = Style::fg(Rgb::new(235, 235, 235)).bold();
const TEXT: Style = Style::fg(Rgb::new(220, 220, 220));
const HIGHLIGHT: Style = Style::fg(Rgb::new(120, 220, 140)).bold();
const ALERT: Style = Style::fg(Rgb::new(240, 110, 100)).bold();
const DIM: Style = Style::fg(Rgb::new(120, 120, 130)).dim();

#[derive(Debug, Clone, Default)]
pub struct ScoreboardView;

impl ScoreboardView {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, snap: &MatchSnapshot, status: &StatusView, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, status, viewport, &mut fb);
        fb
    }

    /// Render into an existing framebuffer (reused across frames).
    pub fn render_into(
        &self,
        snap: &MatchSnapshot,
        status: &StatusView,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear();

        let mut y = 0u16;
        let title = format!("{} v {}", snap.team_a.name, snap.team_b.name);
        let x = fb.put_str(1, y, &title, TITLE);
        fb.put_str(x + 2, y, &format!("{} overs a side", snap.total_overs), DIM);
        y += 1;
        fb.rule(y, DIM);
        y += 2;

        if !snap.started {
            y = self.draw_setup(fb, snap, y);
        } else if snap.ended {
            y = self.draw_result(fb, snap, y);
        } else {
            y = self.draw_live(fb, snap, y);
        }

        if status.role == ViewRole::Scorer && snap.live() && input_mode(snap) == InputMode::SelectBowler
        {
            self.draw_bowler_choices(fb, snap, y + 1);
        }

        self.draw_footer(fb, snap, status);
    }

    fn draw_setup(&self, fb: &mut FrameBuffer, snap: &MatchSnapshot, y: u16) -> u16 {
        fb.put_str(1, y, "Match not started.", TEXT);
        fb.put_str(
            1,
            y + 1,
            &format!("{} bat first, {} overs each.", snap.team_a.name, snap.total_overs),
            LABEL,
        );
        y + 3
    }

    fn draw_live(&self, fb: &mut FrameBuffer, snap: &MatchSnapshot, mut y: u16) -> u16 {
        let innings = if snap.innings == 1 { "1st innings" } else { "2nd innings" };
        let x = fb.put_str(1, y, &snap.batting_team().name, VALUE);
        let x = fb.put_str(x + 2, y, &format!("{}/{}", snap.runs, snap.wickets), HIGHLIGHT);
        let x = fb.put_str(x + 2, y, &format!("({} ov)", snap.overs_display()), LABEL);
        let x = fb.put_str(x + 2, y, &format!("RR {:.2}", snap.run_rate()), LABEL);
        fb.put_str(x + 2, y, innings, DIM);
        y += 1;

        if let Some(need) = snap.runs_needed() {
            let left = snap.balls_remaining();
            let mut line = format!("Target {}  need {} off {} balls", snap.target, need, left);
            if left > 0 {
                line.push_str(&format!("  RRR {:.2}", need as f64 * 6.0 / left as f64));
            }
            fb.put_str(1, y, &line, ALERT);
        } else if snap.extras > 0 {
            fb.put_str(1, y, &format!("Extras {}", snap.extras), LABEL);
        }
        y += 2;

        fb.put_str(1, y, &format!("{:<24}{:>5}{:>5}{:>5}{:>5}{:>8}", "Batsman", "R", "B", "4s", "6s", "SR"), LABEL);
        y += 1;
        for b in snap.current_batsmen() {
            fb.put_str(1, y, &batsman_row(b), if b.is_striker { VALUE } else { TEXT });
            y += 1;
        }
        y += 1;

        fb.put_str(1, y, &format!("{:<24}{:>5}{:>5}{:>5}{:>8}", "Bowler", "O", "R", "W", "Econ"), LABEL);
        y += 1;
        match snap.current_bowler() {
            Some(b) => {
                let row = format!(
                    "{:<24}{:>5}{:>5}{:>5}{:>8.2}",
                    truncate(&b.name, 23),
                    b.overs_display(),
                    b.runs,
                    b.wickets,
                    b.economy()
                );
                fb.put_str(1, y, &row, TEXT);
            }
            None => {
                fb.put_str(1, y, "no bowler selected", ALERT);
            }
        }
        y += 2;

        if let Some(ball) = snap.last_ball.as_ref() {
            let x = fb.put_str(1, y, &format!("{:>5} ", ball.label()), DIM);
            let style = if ball.is_wicket {
                ALERT
            } else if ball.is_boundary {
                HIGHLIGHT
            } else {
                TEXT
            };
            fb.put_str(x, y, &ball.commentary, style);
            y += 1;
        }
        y
    }

    fn draw_result(&self, fb: &mut FrameBuffer, snap: &MatchSnapshot, mut y: u16) -> u16 {
        if let Some(summary) = snap.result_summary.as_deref() {
            fb.put_str(1, y, summary, HIGHLIGHT);
            y += 1;
        }
        if let Some(mom) = snap.man_of_match.as_deref() {
            let x = fb.put_str(1, y, "Man of the match: ", LABEL);
            fb.put_str(x, y, mom, VALUE);
            y += 1;
        }
        y += 1;
        for innings in [snap.innings1.as_ref(), snap.innings2.as_ref()].into_iter().flatten() {
            let x = fb.put_str(1, y, &format!("{:<20}", truncate(&innings.team_name, 19)), TEXT);
            fb.put_str(x, y, &innings.scoreline(), VALUE);
            y += 1;
        }
        y
    }

    fn draw_bowler_choices(&self, fb: &mut FrameBuffer, snap: &MatchSnapshot, mut y: u16) {
        fb.put_str(1, y, "Select next bowler:", ALERT);
        y += 1;
        for (i, player) in snap.bowler_choices().into_iter().enumerate() {
            let Some(key) = bowler_key(i) else {
                break;
            };
            let x = fb.put_str(3, y, &format!("[{key}] "), VALUE);
            let x = fb.put_str(x, y, &player.name, TEXT);
            fb.put_str(x + 1, y, &format!("({})", player.role.as_str()), DIM);
            y += 1;
        }
    }

    fn draw_footer(&self, fb: &mut FrameBuffer, snap: &MatchSnapshot, status: &StatusView) {
        let h = fb.height();
        if h < 3 {
            return;
        }

        if let Some(notice) = status.notice.as_deref() {
            fb.put_str(1, h - 3, notice, ALERT);
        }

        let help = match status.role {
            ViewRole::Viewer => "q quit",
            ViewRole::Scorer if !snap.live() => "Enter start  R reset  q quit",
            ViewRole::Scorer => match input_mode(snap) {
                InputMode::SelectBowler => "a-k pick bowler  R reset  q quit",
                InputMode::Scoring => {
                    "0-3,5 runs  4/6 boundary  w/n extra  x wicket  s strike  o new over  R reset  q quit"
                }
            },
        };
        fb.put_str(1, h - 2, help, DIM);

        let channel = match (status.role, status.channel.as_deref()) {
            (ViewRole::Scorer, Some(addr)) => format!("LIVE {addr}"),
            (ViewRole::Viewer, Some(scorer)) => format!("WATCHING {scorer}"),
            (_, None) => "offline".to_string(),
        };
        fb.put_str(1, h - 1, &channel, LABEL);
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn batsman_row(b: &BatsmanRecord) -> String {
    let name = if b.is_striker {
        format!("{}*", truncate(&b.name, 22))
    } else {
        truncate(&b.name, 23)
    };
    format!(
        "{:<24}{:>5}{:>5}{:>5}{:>5}{:>8.2}",
        name,
        b.runs,
        b.balls,
        b.fours,
        b.sixes,
        b.strike_rate()
    )
}
