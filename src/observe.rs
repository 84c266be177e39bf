//! Viewer client for a live match.
//!
//! Connects to a scorer's live channel as a read-only viewer and turns the
//! line-delimited JSON stream into [`ObserveEvent`]s on a std channel, read
//! by the viewer's draw loop.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::{
    create_hello, ErrorCode, ErrorMessage, ObservationMessage, RequestedRole, WelcomeMessage,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveConfig {
    pub host: String,
    pub port: u16,
    /// Viewer token, when the scorer requires one
    pub token: Option<String>,
    /// Scorer id expected on the other end
    pub watch: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ObserveEvent {
    Welcome { client_id: u64, scorer_id: String },
    Observation(Box<ObservationMessage>),
    Error { code: Option<ErrorCode>, message: String },
    Closed,
}

impl ObserveEvent {
    /// Status-line text for an error event.
    pub fn describe_error(code: Option<ErrorCode>, message: &str) -> String {
        match code {
            Some(ErrorCode::Unauthorized) => "viewer token rejected by the scorer".to_string(),
            Some(ErrorCode::UnknownMatch) => "that scorer is not broadcasting here".to_string(),
            Some(ErrorCode::ProtocolMismatch) => format!("incompatible scorer: {message}"),
            _ => message.to_string(),
        }
    }
}

/// Connect, send the viewer hello and spawn the reader thread.
pub fn connect_observer(config: &ObserveConfig) -> Result<mpsc::Receiver<ObserveEvent>> {
    let mut stream = TcpStream::connect((config.host.as_str(), config.port))
        .with_context(|| format!("observe: connect {}:{} failed", config.host, config.port))?;
    stream.set_nodelay(true).context("observe: set_nodelay failed")?;

    let mut hello = create_hello(1, "cricket-scorer-observe", RequestedRole::Viewer);
    hello.token = config.token.clone();
    hello.watch = config.watch.clone();
    let line = serde_json::to_string(&hello)?;
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;

    let (tx, rx) = mpsc::channel::<ObserveEvent>();
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    let _ = tx.send(ObserveEvent::Error {
                        code: None,
                        message: format!("observe: read error: {e}"),
                    });
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_server_line(&line) {
                Some(event) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                None => debug!(%line, "ignoring server line"),
            }
        }
        let _ = tx.send(ObserveEvent::Closed);
    });

    Ok(rx)
}

/// Block until the welcome arrives. Errors and early disconnects fail.
pub fn wait_for_welcome(rx: &mpsc::Receiver<ObserveEvent>, timeout: Duration) -> Result<(u64, String)> {
    let deadline = Instant::now() + timeout;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(anyhow!("observe: no welcome within {:?}", timeout));
        }
        match rx.recv_timeout(left) {
            Ok(ObserveEvent::Welcome { client_id, scorer_id }) => return Ok((client_id, scorer_id)),
            Ok(ObserveEvent::Error { code, message }) => {
                return Err(anyhow!("observe: {}", ObserveEvent::describe_error(code, &message)));
            }
            Ok(ObserveEvent::Closed) => return Err(anyhow!("observe: connection closed before welcome")),
            Ok(ObserveEvent::Observation(_)) => continue,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(anyhow!("observe: reader stopped before welcome"));
            }
        }
    }
}

/// Decode one server line. Acks and unknown types yield `None`.
pub fn parse_server_line(line: &str) -> Option<ObserveEvent> {
    let value: Value = serde_json::from_str(line).ok()?;
    match value.get("type")?.as_str()? {
        "welcome" => {
            let welcome: WelcomeMessage = serde_json::from_value(value).ok()?;
            Some(ObserveEvent::Welcome {
                client_id: welcome.client_id,
                scorer_id: welcome.scorer_id,
            })
        }
        "observation" => match serde_json::from_value::<ObservationMessage>(value) {
            Ok(obs) => Some(ObserveEvent::Observation(Box::new(obs))),
            Err(e) => {
                warn!(error = %e, "malformed observation");
                None
            }
        },
        "error" => match serde_json::from_value::<ErrorMessage>(value.clone()) {
            Ok(err) => Some(ObserveEvent::Error {
                code: Some(err.code),
                message: err.message,
            }),
            Err(_) => Some(ObserveEvent::Error {
                code: None,
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
        },
        _ => None,
    }
}
