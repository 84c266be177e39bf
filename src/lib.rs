//! Cricket scorer (workspace facade crate).
//!
//! Re-exports the member crates under short names and hosts the pieces that
//! tie them together: configuration, the scoring session and the viewer
//! client used by `cricket-scorer observe`.

pub use cricket_scorer_adapter as adapter;
pub use cricket_scorer_core as core;
pub use cricket_scorer_input as input;
pub use cricket_scorer_stats as stats;
pub use cricket_scorer_store as store;
pub use cricket_scorer_term as term;
pub use cricket_scorer_types as types;

pub mod config;
pub mod observe;
pub mod session;
