//! Stage display session: connect / authenticate / subscribe state machine.
//!
//! The session never touches a socket.  The infrastructure layer reports what
//! happened on the WebSocket as a [`TransportEvent`]; the session updates its
//! state and answers with at most one [`SessionAction`] for the caller to
//! carry out.
//!
//! ```text
//!                 begin_connect()          Opened / send ath
//! Disconnected ───────────────► Connecting ─────────────────► Authenticating
//!      ▲                                                            │
//!      │ Closed (from any state)                 ath == true / send asl
//!      │                                                            ▼
//!      └──────────────────────────────────────────────────────── Subscribed
//! ```
//!
//! Errors never change state: a refused or broken connection is always
//! followed by `Closed`, and the reconnect supervisor polls
//! [`Session::needs_reconnect`] to start over with a fresh session.

use cue_core::{select_text_pair, StageEvent, StageRequest, TextPair};
use tracing::{debug, info, warn};

use crate::domain::config::RX_TARGET;

/// Connection lifecycle of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Subscribed,
}

/// Why a transport reported an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Nothing is listening yet; expected while polling for the tool.
    Refused,
    /// Anything else, with a human-readable description.
    Other(String),
}

/// Everything the WebSocket layer can report to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    Errored(TransportFailure),
    MessageReceived(String),
}

/// What the caller must do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this request on the WebSocket.
    Send(StageRequest),
    /// Hand this text to the output scheduler.
    Route(TextPair),
}

/// One stage display session.
///
/// A new `Session` is created for every connection attempt; the layout id it
/// learns does not outlive the connection it was learned on.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    layout_uid: Option<String>,
    password: String,
}

impl Session {
    /// Creates a session in [`SessionState::Disconnected`].
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            state: SessionState::Disconnected,
            layout_uid: None,
            password: password.into(),
        }
    }

    /// Marks the start of a connection attempt.
    pub fn begin_connect(&mut self) {
        self.state = SessionState::Connecting;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identifier of the stage display layout currently subscribed to.
    pub fn layout_uid(&self) -> Option<&str> {
        self.layout_uid.as_deref()
    }

    /// `true` when the connection is neither open nor being opened.
    pub fn needs_reconnect(&self) -> bool {
        self.state == SessionState::Disconnected
    }

    /// Applies one transport event.
    pub fn handle(&mut self, event: TransportEvent) -> Option<SessionAction> {
        match event {
            TransportEvent::Opened => {
                self.state = SessionState::Authenticating;
                Some(SessionAction::Send(StageRequest::authenticate(
                    self.password.clone(),
                )))
            }

            TransportEvent::Closed => {
                if self.state == SessionState::Connecting {
                    // Never opened: the refusal was already reported.
                    debug!("connection attempt ended");
                } else if self.state != SessionState::Disconnected {
                    info!("connection closed");
                }
                self.state = SessionState::Disconnected;
                None
            }

            TransportEvent::Errored(TransportFailure::Refused) => {
                debug!("connection refused; stage display not reachable yet");
                None
            }

            TransportEvent::Errored(TransportFailure::Other(reason)) => {
                warn!("stage display connection error: {reason}");
                None
            }

            TransportEvent::MessageReceived(text) => self.handle_message(&text),
        }
    }

    fn handle_message(&mut self, text: &str) -> Option<SessionAction> {
        let event = match StageEvent::from_json(text) {
            Ok(ev) => ev,
            Err(e) => {
                debug!(target: RX_TARGET, "dropping malformed stage display frame: {e}");
                return None;
            }
        };
        debug!(target: RX_TARGET, "{event:?}");

        match event {
            StageEvent::AuthResult { ath: true, .. } => {
                info!("auth ok");
                self.state = SessionState::Subscribed;
                Some(SessionAction::Send(StageRequest::ActiveLayouts))
            }

            StageEvent::AuthResult { ath: false, err } => {
                // No retry: a wrong password needs an operator.
                warn!("auth error: {}", err.as_deref().unwrap_or("rejected"));
                None
            }

            StageEvent::ActiveLayouts { ary } => {
                let uid = ary.into_iter().next().and_then(|layout| layout.uid)?;
                Some(self.subscribe_layout(uid))
            }

            StageEvent::LayoutPushed { uid } => uid.map(|uid| self.subscribe_layout(uid)),

            StageEvent::FieldValues { ary } => select_text_pair(&ary).map(SessionAction::Route),

            StageEvent::Unrecognized => None,
        }
    }

    fn subscribe_layout(&mut self, uid: String) -> SessionAction {
        info!("stage display layout: {uid}");
        self.layout_uid = Some(uid.clone());
        SessionAction::Send(StageRequest::FieldValues { uid })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
