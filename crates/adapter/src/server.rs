//! TCP server for the live scoring channel
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::{MatchSnapshot, ScoreEvent};
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

// Lets serde_json stream straight into the hasher.
impl io::Write for Fnv1aHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        std::hash::Hasher::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Append every line sent or received to this file
    pub log_path: Option<String>,
    /// Viewers must present this token when set
    pub viewer_token: Option<String>,
    /// Token for the scorer seat. Without it the seat falls back to the
    /// viewer token (or is open when neither is set)
    pub scorer_token: Option<String>,
    /// Identity of the scorer whose match this server broadcasts
    pub scorer_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
            log_path: None,
            viewer_token: None,
            scorer_token: None,
            scorer_id: "local".to_string(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ServerConfig {
    /// Create from `CRICKET_LIVE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = non_empty_env("CRICKET_LIVE_HOST").unwrap_or(defaults.host);
        let port = non_empty_env("CRICKET_LIVE_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = non_empty_env("CRICKET_LIVE_MAX_PENDING")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands,
            log_path: non_empty_env("CRICKET_LIVE_LOG_PATH"),
            viewer_token: non_empty_env("CRICKET_LIVE_VIEWER_TOKEN"),
            scorer_token: non_empty_env("CRICKET_LIVE_SCORER_TOKEN"),
            scorer_id: non_empty_env("CRICKET_SCORER_ID").unwrap_or(defaults.scorer_id),
        }
    }

    /// Check if the live channel is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("CRICKET_LIVE_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid live channel address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: Arc<RwLock<Vec<ClientHandle>>>,
    scorer: Arc<RwLock<Option<usize>>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(Vec::new())),
            scorer: Arc::new(RwLock::new(None)),
        }
    }

    fn access(&self, token: Option<&str>) -> Access {
        access_for(&self.config, token)
    }
}

/// What a hello token entitles a connection to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Denied,
    Watch,
    Score,
}

fn access_for(config: &ServerConfig, token: Option<&str>) -> Access {
    let viewer = config.viewer_token.as_deref();
    match config.scorer_token.as_deref() {
        Some(scorer) if token == Some(scorer) => Access::Score,
        Some(_) => match viewer {
            Some(v) if token != Some(v) => Access::Denied,
            _ => Access::Watch,
        },
        None => match viewer {
            Some(v) if token != Some(v) => Access::Denied,
            _ => Access::Score,
        },
    }
}

async fn is_handshaken(state: &Arc<ServerState>, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn is_scorer(state: &Arc<ServerState>, client_id: usize) -> bool {
    *state.scorer.read().await == Some(client_id)
}

async fn is_read_only(state: &Arc<ServerState>, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.read_only)
        .unwrap_or(true)
}

async fn check_and_update_seq(state: &Arc<ServerState>, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub handshaken: bool,
    /// Requested the viewer role or lacks the scorer token; may never score
    /// on this connection
    pub read_only: bool,
    pub stream_observations: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(Arc<ObservationMessage>),
}

#[derive(Debug, Clone)]
enum WireRecord {
    Bytes(Vec<u8>),
    Out(ClientOutbound),
}

fn encode_outbound(msg: &ClientOutbound, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    buf.clear();
    match msg {
        ClientOutbound::Ack(v) => serde_json::to_writer(&mut *buf, v),
        ClientOutbound::Error(v) => serde_json::to_writer(&mut *buf, v),
        ClientOutbound::Welcome(v) => serde_json::to_writer(&mut *buf, v),
        ClientOutbound::Observation(v) => serde_json::to_writer(&mut *buf, v.as_ref()),
    }
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path, error = %e, "wire log unavailable");
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(rec) = rx.recv().await {
            let bytes: &[u8] = match &rec {
                WireRecord::Bytes(b) => b,
                WireRecord::Out(msg) => {
                    if encode_outbound(msg, &mut buf).is_err() {
                        continue;
                    }
                    &buf
                }
            };
            if file.write_all(bytes).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Start the TCP server.
///
/// Sends the bound address on `ready_tx` once listening (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind live channel on {addr}"))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, scorer_id = %config.scorer_id, "live channel listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs));
                        }
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(Arc::clone(&obs)));
                        }
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Ack(ack));
                        }
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Error(err));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx, wire_log_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<WireRecord>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            handshaken: false,
            read_only: false,
            stream_observations: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_tx_out = wire_log_tx.clone();

    // Writer task: serialize and flush one line per message.
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if encode_outbound(&msg, &mut buf).is_err() {
                continue;
            }
            if writer.write_all(&buf).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = wire_log_tx_out.as_ref() {
                let _ = log.send(WireRecord::Out(msg));
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(WireRecord::Bytes(raw_line.as_bytes().to_vec()));
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !hello.protocol_version.starts_with("1.") {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                if let Some(watch) = hello.watch.as_deref() {
                    if watch != state.config.scorer_id {
                        reply_error(
                            hello.seq,
                            ErrorCode::UnknownMatch,
                            &format!("No live match for scorer {watch}"),
                        );
                        break;
                    }
                }

                let access = state.access(hello.token.as_deref());
                if access == Access::Denied {
                    warn!(client_id, %addr, "hello rejected: bad token");
                    reply_error(hello.seq, ErrorCode::Unauthorized, "Token rejected");
                    break;
                }

                let requested = hello.requested.role.unwrap_or(RequestedRole::Auto);
                let may_score = access == Access::Score && requested != RequestedRole::Viewer;
                let role = {
                    let mut scorer = state.scorer.write().await;
                    let already_scorer = *scorer == Some(client_id);
                    if already_scorer || (may_score && scorer.is_none()) {
                        *scorer = Some(client_id);
                        AssignedRole::Scorer
                    } else {
                        AssignedRole::Viewer
                    }
                };

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.read_only = role == AssignedRole::Viewer && !may_score;
                        client.stream_observations = hello.requested.stream_observations;
                        client.last_seq = Some(hello.seq);
                    }
                }

                let scorer_client_id = state.scorer.read().await.map(|id| id as u64);
                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    &state.config.scorer_id,
                    scorer_client_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));
                info!(client_id, client = %hello.client.name, ?role, "handshake complete");

                // Late joiners get the current state straight away.
                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(&state, client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }

                if !check_and_update_seq(&state, client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !is_scorer(&state, client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotScorer, "Only the scorer may send commands");
                    continue;
                }

                if cmd.commands.is_empty() {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "Missing commands");
                    continue;
                }

                // Backpressure: bounded queue. The host acks after applying.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Commands(cmd.commands.to_vec()),
                    })
                    .is_err()
                {
                    debug!(client_id, seq = cmd.seq, "command queue full");
                    reply_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !is_handshaken(&state, client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }

                if !check_and_update_seq(&state, client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                match ctrl.action {
                    ControlAction::Claim => {
                        if is_read_only(&state, client_id).await {
                            reply_error(ctrl.seq, ErrorCode::NotScorer, "Viewers may not claim the scorer role");
                            continue;
                        }
                        let mut scorer = state.scorer.write().await;
                        match *scorer {
                            None => {
                                *scorer = Some(client_id);
                                info!(client_id, "scorer role claimed");
                                let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, 0, 0)));
                            }
                            Some(id) if id == client_id => {
                                let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, 0, 0)));
                            }
                            Some(_) => {
                                reply_error(ctrl.seq, ErrorCode::ScorerActive, "Scorer already assigned");
                            }
                        }
                    }
                    ControlAction::Release => {
                        let mut scorer = state.scorer.write().await;
                        if *scorer == Some(client_id) {
                            *scorer = None;
                            info!(client_id, "scorer role released");
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, 0, 0)));
                        } else {
                            reply_error(ctrl.seq, ErrorCode::NotScorer, "Only the scorer may release");
                        }
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, unknown.seq).await
                {
                    reply_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Clean up: remove the client and free the scorer role. Viewers are never promoted.
    {
        let mut scorer = state.scorer.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        if *scorer == Some(client_id) {
            *scorer = None;
            info!(client_id, "scorer disconnected; role released");
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Build an observation message from a match snapshot.
///
/// `state_hash` covers the snapshot and the last event, so two observations
/// hash equal exactly when a viewer would render them the same.
pub fn build_observation(
    snapshot: &MatchSnapshot,
    seq: u64,
    scorer_id: &str,
    last_event: Option<ScoreEvent>,
) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    // Serializing plain data into an in-memory sink cannot fail.
    let _ = serde_json::to_writer(&mut hasher, snapshot);
    last_event.is_some().hash(&mut hasher);
    if let Some(ev) = last_event.as_ref() {
        let _ = serde_json::to_writer(&mut hasher, ev);
    }

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        scorer_id: scorer_id.to_string(),
        state_hash: StateHash(hasher.finish()),
        last_event,
        snapshot: snapshot.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchState;
    use crate::types::ScoreCommand;

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"command"}"#), None);
        assert_eq!(extract_seq_best_effort(r#"{"seq":"x"}"#), None);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.max_pending_commands, 16);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
        assert!(config.viewer_token.is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 7878);
    }

    #[test]
    fn test_token_access() {
        let open = ServerConfig::default();
        assert_eq!(access_for(&open, None), Access::Score);

        let viewers = ServerConfig {
            viewer_token: Some("watch".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(access_for(&viewers, None), Access::Denied);
        assert_eq!(access_for(&viewers, Some("guess")), Access::Denied);
        assert_eq!(access_for(&viewers, Some("watch")), Access::Score);

        let both = ServerConfig {
            scorer_token: Some("score".to_string()),
            ..viewers
        };
        assert_eq!(access_for(&both, Some("watch")), Access::Watch);
        assert_eq!(access_for(&both, Some("score")), Access::Score);
        assert_eq!(access_for(&both, None), Access::Denied);

        let scorer_only = ServerConfig {
            scorer_token: Some("score".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(access_for(&scorer_only, None), Access::Watch);
        assert_eq!(access_for(&scorer_only, Some("score")), Access::Score);
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_fnv1a_known_vector() {
        use std::hash::Hasher;
        let mut h = Fnv1aHasher::new();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_state_hash_is_deterministic() {
        let mut game = MatchState::new();
        game.start().unwrap();
        game.apply(ScoreCommand::runs(3));

        let snap = game.snapshot();
        let obs1 = build_observation(&snap, 1, "local", None);
        let obs2 = build_observation(&snap, 2, "local", None);
        assert_eq!(obs1.state_hash, obs2.state_hash);
    }

    #[test]
    fn test_state_hash_changes_with_score() {
        let mut game = MatchState::new();
        game.start().unwrap();
        let before = build_observation(&game.snapshot(), 1, "local", None);

        game.apply(ScoreCommand::extra());
        let event = game.take_last_event();
        let after = build_observation(&game.snapshot(), 2, "local", event.clone());
        assert_ne!(before.state_hash, after.state_hash);

        let without_event = build_observation(&game.snapshot(), 3, "local", None);
        assert_ne!(after.state_hash, without_event.state_hash);
        assert_eq!(after.last_event, event);
    }
}
