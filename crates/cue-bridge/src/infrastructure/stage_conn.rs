//! WebSocket client for the stage display endpoint.
//!
//! Each connection attempt runs in its own Tokio task.  The task reports what
//! happens on the socket as [`TransportEvent`]s through an mpsc channel,
//! tagged with the attempt's *generation* so the event loop can discard events
//! from a connection it already gave up on.
//!
//! Every task ends with exactly one `Closed` event, whether the connection
//! was refused, dropped by the peer, or shut down locally.
//!
//! ```text
//!  event loop ── Outbound::Text / Close ──► connection task ──► WebSocket
//!      ▲                                         │
//!      └────────── ConnectionEvent ◄─────────────┘
//! ```

use std::io::ErrorKind;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::debug;

use crate::application::session::{TransportEvent, TransportFailure};

/// How long [`StageConnection::shutdown`] waits for the close handshake.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// A transport event from one specific connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub generation: u64,
    pub event: TransportEvent,
}

/// Commands from the event loop to the connection task.
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Handle to one connection attempt.
///
/// Dropping the handle without calling [`StageConnection::shutdown`] leaves
/// the task to notice the closed command channel and close the socket itself.
pub struct StageConnection {
    generation: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

impl StageConnection {
    /// Starts connecting to `url` in the background.
    pub fn open(
        url: String,
        generation: u64,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(url, generation, events, outbound_rx));
        Self {
            generation,
            outbound,
            task,
        }
    }

    /// Queues a text frame.  Frames sent before the socket opened or after it
    /// closed are dropped.
    pub fn send(&self, text: String) {
        if self.outbound.send(Outbound::Text(text)).is_err() {
            debug!("connection {} already finished; frame dropped", self.generation);
        }
    }

    /// Sends a close frame and waits up to [`CLOSE_TIMEOUT`] for the task to
    /// finish, then aborts it.
    pub async fn shutdown(self) {
        let _ = self.outbound.send(Outbound::Close);
        let mut task = self.task;
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
            debug!("connection {} did not close in time; aborting", self.generation);
            task.abort();
        }
    }
}

/// Body of the connection task.
async fn run_connection(
    url: String,
    generation: u64,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let emit = |event: TransportEvent| {
        // The receiver only goes away when the bridge is shutting down.
        let _ = events.send(ConnectionEvent { generation, event });
    };

    debug!("connecting to {url} (connection {generation})");
    let ws_stream = tokio::select! {
        result = connect_async(url.as_str()) => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                emit(TransportEvent::Errored(classify(&e)));
                emit(TransportEvent::Closed);
                return;
            }
        },
        // Shut down (or dropped) before the handshake finished.
        _ = wait_for_close(&mut outbound) => {
            emit(TransportEvent::Closed);
            return;
        }
    };

    emit(TransportEvent::Opened);
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => emit(TransportEvent::MessageReceived(text)),
                Some(Ok(WsMessage::Close(_))) | None => {
                    debug!("connection {generation}: closed by peer");
                    break;
                }
                // Binary frames are not part of the protocol; ping/pong is
                // answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => break,
                Some(Err(e)) => {
                    emit(TransportEvent::Errored(classify(&e)));
                    break;
                }
            },
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        emit(TransportEvent::Errored(classify(&e)));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = sink.close().await {
                        debug!("connection {generation}: close handshake failed: {e}");
                    }
                    break;
                }
            },
        }
    }

    emit(TransportEvent::Closed);
}

/// Resolves once a close is requested or the handle is dropped.
async fn wait_for_close(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    while let Some(command) = outbound.recv().await {
        match command {
            Outbound::Text(_) => debug!("frame sent before the socket opened; dropped"),
            Outbound::Close => return,
        }
    }
}

/// Maps a tungstenite error onto the session's failure kinds.
fn classify(error: &WsError) -> TransportFailure {
    match error {
        WsError::Io(e) if e.kind() == ErrorKind::ConnectionRefused => TransportFailure::Refused,
        other => TransportFailure::Other(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
