//! Live scoring channel - match broadcast and remote scoring over TCP
//!
//! Viewers follow a match as it is scored; a remote scorer can drive the
//! state machine from another process.
//!
//! # Protocol Overview
//!
//! A **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Roles**: The first non-viewer client to hello becomes the scorer;
//!    everyone else is a viewer
//! 4. **Observation Streaming**: After every accepted transition the host
//!    publishes the full match snapshot
//! 5. **Scoring**: Only the scorer may send `command` messages
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, requested role, viewer token,
//!   scorer identity to watch
//! - **command**: up to 16 scoring commands, applied in order
//! - **control**: claim or release the scorer role
//!
//! ## Server → Client
//!
//! - **welcome**: assigned client id and role, broadcast scorer identity
//! - **observation**: snapshot, last event and a stable FNV-1a `state_hash`
//! - **ack**: commands applied (sent once the host has run them)
//! - **error**: error response with code and message
//!
//! # Rules
//!
//! - Sequence numbers must strictly increase per client
//! - A viewer never becomes the scorer automatically; when the scorer
//!   disconnects the role is simply vacated
//! - With `CRICKET_LIVE_VIEWER_TOKEN` set, every client must present it (or
//!   the scorer token); any other token gets `unauthorized` and a disconnect
//! - With `CRICKET_LIVE_SCORER_TOKEN` set, only a client presenting it can
//!   take or claim the scorer seat
//! - Commands wait in a bounded queue; a full queue answers `backpressure`
//!
//! # Environment Variables
//!
//! - `CRICKET_LIVE_HOST`: Bind address (default: "127.0.0.1")
//! - `CRICKET_LIVE_PORT`: Port number (default: 7878)
//! - `CRICKET_LIVE_DISABLED`: Set to "1" or "true" to disable the channel
//! - `CRICKET_LIVE_MAX_PENDING`: Command queue depth (default: 16)
//! - `CRICKET_LIVE_LOG_PATH`: Append all wire traffic to this file
//! - `CRICKET_LIVE_VIEWER_TOKEN`: Token required from every client
//! - `CRICKET_LIVE_SCORER_TOKEN`: Token required for the scorer seat
//! - `CRICKET_SCORER_ID`: Scorer identity the broadcast is keyed by
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"pavilion","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true,"role":"viewer"}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":2,"role":"viewer","scorer_id":"local",...}
//! Server -> Client: {"type":"observation","seq":7,"ts":1700000000002,"scorer_id":"local","state_hash":"…","snapshot":{...}}
//! ```
//!
//! A scorer sends:
//!
//! ```text
//! {"type":"command","seq":2,"ts":1700000000100,"commands":[{"op":"ball","runs":4,"isBoundary":true},{"op":"wicket"}]}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use cricket_scorer_core as core;
pub use cricket_scorer_types as types;

pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, run_server, ServerConfig};
