//! Adapter runtime integration.
//!
//! Bridges the synchronous scoring loop with the async TCP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

use crate::core::{MatchSnapshot, ScoreEvent};
use crate::protocol::{create_ack, create_error, AckMessage, ErrorCode, ErrorMessage, ObservationMessage};
use crate::server::{build_observation, run_server, ServerConfig};
use crate::types::ScoreCommand;

/// Command delivered to the scoring loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Scoring commands to apply in order
    Commands(Vec<ScoreCommand>),
    /// A streaming client just joined and needs the current state
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientObservation { client_id: usize, obs: Arc<ObservationMessage> },
    BroadcastObservation { obs: Arc<ObservationMessage> },
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    scorer_id: String,
    next_seq: u64,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the live channel with an explicit configuration.
    ///
    /// Blocks until the listener is bound (or fails to bind).
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let scorer_id = config.scorer_id.clone();
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                error!(error = %e, "live channel stopped");
            }
        });

        let addr = rt
            .block_on(async { tokio::time::timeout(Duration::from_secs(5), ready_rx).await })
            .map_err(|_| anyhow!("live channel did not start in time"))?
            .map_err(|_| anyhow!("live channel failed to bind"))?;

        Ok(Self {
            _rt: rt,
            addr,
            scorer_id,
            next_seq: 1,
            cmd_rx,
            out_tx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    /// Queue a message for delivery. Never blocks.
    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn ack(&self, client_id: usize, seq: u64, applied: u32, ignored: u32) {
        self.send(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(seq, applied, ignored),
        });
    }

    pub fn reject(&self, client_id: usize, seq: u64, code: ErrorCode, message: &str) {
        self.send(OutboundMessage::ToClientError {
            client_id,
            err: create_error(seq, code, message),
        });
    }

    fn observation(&mut self, snapshot: &MatchSnapshot, last_event: Option<ScoreEvent>) -> Arc<ObservationMessage> {
        let seq = self.next_seq;
        self.next_seq += 1;
        Arc::new(build_observation(snapshot, seq, &self.scorer_id, last_event))
    }

    /// Broadcast the current state to every streaming client.
    pub fn publish(&mut self, snapshot: &MatchSnapshot, last_event: Option<ScoreEvent>) {
        let obs = self.observation(snapshot, last_event);
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    /// Send the current state to one client (late joiner).
    pub fn send_snapshot(&mut self, client_id: usize, snapshot: &MatchSnapshot) {
        let obs = self.observation(snapshot, None);
        self.send(OutboundMessage::ToClientObservation { client_id, obs });
    }
}
