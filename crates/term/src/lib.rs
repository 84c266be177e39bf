//! Terminal scoreboard.
//!
//! The scoreboard is drawn into a small text framebuffer by a pure view and
//! then flushed to the terminal by a renderer that only rewrites changed rows.
//! No widget toolkit is involved.
//!
//! - [`ScoreboardView`]: `MatchSnapshot` -> [`FrameBuffer`] (no I/O, unit-tested)
//! - [`TerminalRenderer`]: raw mode, alternate screen, row diffs via crossterm

pub mod fb;
pub mod renderer;
pub mod scoreboard;

pub use cricket_scorer_core as core;
pub use cricket_scorer_input as input;
pub use cricket_scorer_types as types;

pub use fb::{Cell, FrameBuffer, Rgb, Style};
pub use renderer::{encode_changed_rows_into, encode_full_into, TerminalRenderer};
pub use scoreboard::{ScoreboardView, StatusView, ViewRole, Viewport};
