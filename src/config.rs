//! Application configuration from `CRICKET_*` environment variables.
//!
//! Command-line flags override these (see the binary).

use std::path::PathBuf;

use crate::types::DEFAULT_TOTAL_OVERS;

pub const DEFAULT_SCORER_ID: &str = "local";
pub const DEFAULT_DATA_DIR: &str = "cricket-data";
pub const DEFAULT_LOG_PATH: &str = "cricket-scorer.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Owner of saved records and key of the live broadcast
    pub scorer_id: String,
    pub data_dir: PathBuf,
    pub total_overs: u32,
    /// Log file used while the terminal UI owns the screen
    pub log_path: PathBuf,
    /// Completed matches are appended to this tournament
    pub tournament_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scorer_id: DEFAULT_SCORER_ID.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            total_overs: DEFAULT_TOTAL_OVERS,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            tournament_id: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            scorer_id: get("CRICKET_SCORER_ID").unwrap_or(defaults.scorer_id),
            data_dir: get("CRICKET_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            total_overs: get("CRICKET_TOTAL_OVERS")
                .and_then(|v| v.parse().ok())
                .filter(|&n: &u32| n >= 1)
                .unwrap_or(defaults.total_overs),
            log_path: get("CRICKET_LOG_PATH").map(PathBuf::from).unwrap_or(defaults.log_path),
            tournament_id: get("CRICKET_TOURNAMENT_ID"),
        }
    }
}
