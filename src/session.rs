//! Scoring session: the match state plus everything hanging off it.
//!
//! A session owns the [`MatchState`], forwards accepted changes to the live
//! channel (when one is running), applies commands that arrive from the
//! remote scorer, and hands each completed match to a persistence worker
//! thread so file I/O never stalls the key loop.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use chrono::Utc;
use tracing::{info, warn};

use crate::adapter::{Adapter, ErrorCode, InboundPayload};
use crate::core::{Applied, MatchSetupError, MatchSnapshot, MatchState};
use crate::store::{MatchRecord, Store};
use crate::types::{ScoreCommand, Team};

/// Outcome of a background save, surfaced on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    Saved { match_id: String },
    PersistFailed(String),
}

struct PersistJob {
    record: MatchRecord,
    tournament_id: Option<String>,
}

pub struct ScoringSession {
    state: MatchState,
    adapter: Option<Adapter>,
    owner_id: String,
    tournament_id: Option<String>,
    snapshot: MatchSnapshot,
    persist_tx: Option<mpsc::Sender<PersistJob>>,
    notice_rx: mpsc::Receiver<SessionNotice>,
    worker: Option<JoinHandle<()>>,
    saved: bool,
}

impl ScoringSession {
    pub fn new(
        state: MatchState,
        store: Box<dyn Store + Send>,
        owner_id: impl Into<String>,
        tournament_id: Option<String>,
        adapter: Option<Adapter>,
    ) -> Self {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistJob>();
        let (notice_tx, notice_rx) = mpsc::channel();
        let worker = thread::spawn(move || persist_worker(store, persist_rx, notice_tx));

        let snapshot = state.snapshot();
        Self {
            state,
            adapter,
            owner_id: owner_id.into(),
            tournament_id,
            snapshot,
            persist_tx: Some(persist_tx),
            notice_rx,
            worker: Some(worker),
            saved: false,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Latest snapshot, refreshed after every accepted change.
    pub fn snapshot(&self) -> &MatchSnapshot {
        &self.snapshot
    }

    pub fn live_addr(&self) -> Option<std::net::SocketAddr> {
        self.adapter.as_ref().map(Adapter::local_addr)
    }

    /// Start with the current teams.
    pub fn start(&mut self) -> Result<(), MatchSetupError> {
        self.state.start()?;
        self.saved = false;
        self.after_change();
        Ok(())
    }

    /// Start with custom squads and overs.
    pub fn start_match(&mut self, team_a: Team, team_b: Team, total_overs: u32) -> Result<(), MatchSetupError> {
        self.state.start_match(team_a, team_b, total_overs)?;
        self.saved = false;
        self.after_change();
        Ok(())
    }

    pub fn apply(&mut self, cmd: ScoreCommand) -> Applied {
        let is_reset = matches!(cmd, ScoreCommand::Reset);
        let applied = self.state.apply(cmd);
        if !applied.is_accepted() {
            return applied;
        }
        if is_reset {
            self.saved = false;
        }
        self.after_change();
        self.persist_if_ended();
        applied
    }

    /// Apply everything the live channel has queued. Returns whether the
    /// state changed.
    pub fn pump_remote(&mut self) -> bool {
        let mut changed = false;
        loop {
            let Some(inbound) = self.adapter.as_mut().and_then(Adapter::try_recv) else {
                break;
            };
            match inbound.payload {
                InboundPayload::Commands(cmds) => {
                    let resets = cmds.iter().any(|c| matches!(c, ScoreCommand::Reset));
                    if !self.state.started() && !resets {
                        if let Some(adapter) = self.adapter.as_ref() {
                            adapter.reject(
                                inbound.client_id,
                                inbound.seq,
                                ErrorCode::InvalidCommand,
                                "Match not started",
                            );
                        }
                        continue;
                    }
                    let (mut applied, mut ignored) = (0u32, 0u32);
                    for cmd in cmds {
                        if self.apply(cmd).is_accepted() {
                            applied += 1;
                        } else {
                            ignored += 1;
                        }
                    }
                    changed |= applied > 0;
                    if let Some(adapter) = self.adapter.as_ref() {
                        adapter.ack(inbound.client_id, inbound.seq, applied, ignored);
                    }
                }
                InboundPayload::SnapshotRequest => {
                    if let Some(adapter) = self.adapter.as_mut() {
                        adapter.send_snapshot(inbound.client_id, &self.snapshot);
                    }
                }
            }
        }
        changed
    }

    /// Next persistence outcome, if any.
    pub fn poll_notice(&self) -> Option<SessionNotice> {
        self.notice_rx.try_recv().ok()
    }

    fn after_change(&mut self) {
        self.state.snapshot_into(&mut self.snapshot);
        let last_event = self.state.take_last_event();
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.publish(&self.snapshot, last_event);
        }
    }

    fn persist_if_ended(&mut self) {
        if self.saved || !self.state.ended() {
            return;
        }
        let Some(record) = MatchRecord::from_completed(
            &self.state,
            &self.owner_id,
            self.tournament_id.as_deref(),
            Utc::now(),
        ) else {
            return;
        };
        self.saved = true;
        info!(match_id = %record.id, result = %record.result, "match complete");
        let job = PersistJob {
            record,
            tournament_id: self.tournament_id.clone(),
        };
        if let Some(tx) = self.persist_tx.as_ref() {
            if tx.send(job).is_err() {
                warn!("persistence worker gone; match not saved");
            }
        }
    }
}

impl Drop for ScoringSession {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued saves and exit.
        self.persist_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn persist_worker(
    mut store: Box<dyn Store + Send>,
    jobs: mpsc::Receiver<PersistJob>,
    notices: mpsc::Sender<SessionNotice>,
) {
    for job in jobs {
        let notice = match save(store.as_mut(), job) {
            Ok(match_id) => {
                info!(%match_id, "match saved");
                SessionNotice::Saved { match_id }
            }
            Err(e) => {
                warn!(error = %e, "failed to save match");
                SessionNotice::PersistFailed(e.to_string())
            }
        };
        let _ = notices.send(notice);
    }
}

fn save(store: &mut dyn Store, job: PersistJob) -> crate::store::Result<String> {
    let match_id = store.save_match(job.record)?;
    if let Some(tid) = job.tournament_id.as_deref() {
        store.add_match_to_tournament(tid, &match_id)?;
    }
    Ok(match_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};
    use std::time::Duration;

    fn wait_notice(session: &ScoringSession) -> SessionNotice {
        for _ in 0..200 {
            if let Some(n) = session.poll_notice() {
                return n;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("no notice from persistence worker");
    }

    fn finish(session: &mut ScoringSession) {
        while session.state().innings() == 1 {
            session.apply(ScoreCommand::runs(1));
        }
        session.apply(ScoreCommand::SelectBowler { player_id: 8 });
        while !session.state().ended() {
            session.apply(ScoreCommand::runs(0));
        }
    }

    #[test]
    fn test_completed_match_is_saved_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let mut session = ScoringSession::new(MatchState::new(), Box::new(store), "club", None, None);
        session.start().unwrap();
        finish(&mut session);

        let SessionNotice::Saved { match_id } = wait_notice(&session) else {
            panic!("expected a save");
        };
        // Further commands after the end are ignored and do not save again.
        assert!(!session.apply(ScoreCommand::runs(4)).is_accepted());
        drop(session);

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let matches = reopened.list_matches("club").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, match_id);
    }

    #[test]
    fn test_tournament_gets_the_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut file_store = JsonFileStore::open(dir.path()).unwrap();
        let tid_file = file_store
            .create_tournament("club", "Cup", vec!["Team A".into(), "Team B".into()], "T2")
            .unwrap();

        let mut session = ScoringSession::new(
            MatchState::new(),
            Box::new(file_store),
            "club",
            Some(tid_file.clone()),
            None,
        );
        session.start().unwrap();
        finish(&mut session);
        let SessionNotice::Saved { match_id } = wait_notice(&session) else {
            panic!("expected a save");
        };
        drop(session);

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get_tournament(&tid_file).unwrap().match_ids, vec![match_id]);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data")).unwrap();
        std::fs::remove_dir_all(dir.path().join("data")).unwrap();

        let mut session = ScoringSession::new(MatchState::new(), Box::new(store), "club", None, None);
        session.start().unwrap();
        finish(&mut session);
        assert!(matches!(wait_notice(&session), SessionNotice::PersistFailed(_)));
    }

    #[test]
    fn test_reset_allows_next_match_to_save() {
        let mut session = ScoringSession::new(MatchState::new(), Box::new(MemoryStore::new()), "club", None, None);
        session.start().unwrap();
        finish(&mut session);
        assert!(matches!(wait_notice(&session), SessionNotice::Saved { .. }));

        assert!(session.apply(ScoreCommand::Reset).is_accepted());
        assert!(!session.state().started());
        session.start().unwrap();
        finish(&mut session);
        assert!(matches!(wait_notice(&session), SessionNotice::Saved { .. }));
    }

    #[test]
    fn test_snapshot_tracks_state() {
        let mut session = ScoringSession::new(MatchState::new(), Box::new(MemoryStore::new()), "club", None, None);
        session.start().unwrap();
        session.apply(ScoreCommand::boundary(4));
        assert_eq!(session.snapshot().runs, 4);
        assert!(session.live_addr().is_none());
        assert!(!session.pump_remote());
    }
}
