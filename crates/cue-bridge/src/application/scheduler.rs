//! Output scheduler: maps routed text onto OSC addresses.
//!
//! For every routed slide the scheduler:
//!
//! 1. Picks the group to publish to.  With two groups configured it
//!    alternates A, B, A, ... so the receiving application can cross-fade
//!    between two text layers; with one group it always picks A.
//! 2. Sends the text to the selected group's primary address right away.
//! 3. Optionally pre-loads the *next* slide's text into the other group's
//!    primary address after a delay, so that layer is ready before it is
//!    faded in.
//! 4. Pulses every secondary address of the selected group with the integer
//!    `1`, delayed when the primary text actually changed so the receiver has
//!    time to render it first.
//!
//! # Time
//!
//! The scheduler never reads the clock and never sleeps.  Callers pass `now`
//! into [`OutputScheduler::route`] and [`OutputScheduler::fire_due`], and ask
//! [`OutputScheduler::next_deadline`] when to call back.  Tests drive it with
//! synthetic instants; the event loop drives it with a tokio sleep.
//!
//! # Failure handling
//!
//! A failed datagram is logged and forgotten.  The group alternation has
//! already flipped by the time anything is sent, so a failure never skews it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use cue_core::{GroupSlot, OscError, OscMessage, OutputGroups};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::config::{ScheduleDelays, TX_TARGET};

/// Value sent to secondary addresses.
pub const TRIGGER_VALUE: i32 = 1;

/// Errors produced by an [`OscTransmitter`].
#[derive(Debug, Error)]
pub enum TransmitError {
    /// The message could not be encoded.
    #[error("failed to encode OSC message: {0}")]
    Encode(#[from] OscError),

    /// The datagram could not be handed to the OS.
    #[error("datagram send to {target} failed: {source}")]
    Io {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for delivering one OSC message.
///
/// Infrastructure implementations write a UDP datagram without blocking; test
/// implementations record calls.
#[cfg_attr(test, mockall::automock)]
pub trait OscTransmitter {
    fn transmit(&self, msg: &OscMessage) -> Result<(), TransmitError>;
}

/// Summary of one [`OutputScheduler::route`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOutcome {
    /// The group the text was published to.
    pub slot: GroupSlot,
    /// Whether the primary send succeeded.
    pub text_sent: bool,
    /// Whether the next text was scheduled for the other group.
    pub next_text_scheduled: bool,
    /// Whether the secondary pulses were deferred.
    pub triggers_deferred: bool,
}

/// A text send waiting for its deadline.  At most one per address.
#[derive(Debug, Clone)]
struct PendingText {
    deadline: Instant,
    text: String,
}

/// A trigger pulse waiting for its deadline.
#[derive(Debug, Clone)]
struct PendingTrigger {
    deadline: Instant,
    address: String,
}

/// Due work collected by `fire_due`, executed in deadline order.
enum DueSend {
    Text { address: String, text: String },
    Trigger { address: String },
}

/// The output scheduler.
pub struct OutputScheduler<T> {
    groups: OutputGroups,
    delays: ScheduleDelays,
    /// `false` selects group A next, `true` group B.
    select_b: bool,
    /// Last text successfully sent, per primary address.
    last_sent: HashMap<String, String>,
    pending_texts: HashMap<String, PendingText>,
    pending_triggers: Vec<PendingTrigger>,
    transmitter: T,
}

impl<T: OscTransmitter> OutputScheduler<T> {
    pub fn new(groups: OutputGroups, delays: ScheduleDelays, transmitter: T) -> Self {
        Self {
            groups,
            delays,
            select_b: false,
            last_sent: HashMap::new(),
            pending_texts: HashMap::new(),
            pending_triggers: Vec::new(),
            transmitter,
        }
    }

    /// Publishes `text`, and schedules `next_text` for the other group.
    pub fn route(&mut self, text: &str, next_text: Option<&str>, now: Instant) -> RouteOutcome {
        let slot = if self.select_b && self.groups.is_alternating() {
            GroupSlot::B
        } else {
            GroupSlot::A
        };
        if self.groups.is_alternating() {
            self.select_b = !self.select_b;
        }

        let selected = self.groups.resolve(slot).clone();
        let other_primary = self
            .groups
            .get(slot.other())
            .map(|g| g.primary().to_string());

        let previous = self.last_sent.get(selected.primary()).cloned();
        let text_sent = self.send_text(selected.primary(), text);

        let next_text_scheduled = match (next_text, self.delays.next_text(), other_primary) {
            (Some(next), Some(delay), Some(address)) => {
                debug!(target: TX_TARGET, "scheduling {address} {next} in {delay:?}");
                self.pending_texts.insert(
                    address,
                    PendingText {
                        deadline: now + delay,
                        text: next.to_string(),
                    },
                );
                true
            }
            _ => false,
        };

        let secondary_delay = self
            .delays
            .secondary()
            .filter(|_| previous.as_deref() != Some(text));
        for address in selected.secondaries() {
            match secondary_delay {
                Some(delay) => self.pending_triggers.push(PendingTrigger {
                    deadline: now + delay,
                    address: address.clone(),
                }),
                None => {
                    self.send_trigger(address);
                }
            }
        }

        info!("TEXT ({slot}): {text}");

        RouteOutcome {
            slot,
            text_sent,
            next_text_scheduled,
            triggers_deferred: secondary_delay.is_some() && !selected.secondaries().is_empty(),
        }
    }

    /// Earliest deadline among pending sends.
    pub fn next_deadline(&self) -> Option<Instant> {
        let texts = self.pending_texts.values().map(|p| p.deadline);
        let triggers = self.pending_triggers.iter().map(|p| p.deadline);
        texts.chain(triggers).min()
    }

    /// Performs every pending send whose deadline is at or before `now`, in
    /// deadline order.  Returns how many were performed.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let mut due: Vec<(Instant, DueSend)> = Vec::new();

        let due_addresses: Vec<String> = self
            .pending_texts
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(address, _)| address.clone())
            .collect();
        for address in due_addresses {
            if let Some(p) = self.pending_texts.remove(&address) {
                due.push((p.deadline, DueSend::Text { address, text: p.text }));
            }
        }

        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_triggers)
            .into_iter()
            .partition(|p| p.deadline <= now);
        self.pending_triggers = waiting;
        due.extend(
            ready
                .into_iter()
                .map(|p| (p.deadline, DueSend::Trigger { address: p.address })),
        );

        due.sort_by_key(|(deadline, _)| *deadline);
        let fired = due.len();
        for (_, send) in due {
            match send {
                DueSend::Text { address, text } => {
                    self.send_text(&address, &text);
                }
                DueSend::Trigger { address } => {
                    self.send_trigger(&address);
                }
            }
        }
        fired
    }

    /// Text waiting to be sent to `address`, if any.
    pub fn pending_text(&self, address: &str) -> Option<&str> {
        self.pending_texts.get(address).map(|p| p.text.as_str())
    }

    /// Last text successfully sent to `address`.
    pub fn last_sent_text(&self, address: &str) -> Option<&str> {
        self.last_sent.get(address).map(String::as_str)
    }

    /// Number of sends still waiting for their deadline.
    pub fn pending_count(&self) -> usize {
        self.pending_texts.len() + self.pending_triggers.len()
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Sends `text` to a primary address, superseding any pending text there.
    fn send_text(&mut self, address: &str, text: &str) -> bool {
        if self.pending_texts.remove(address).is_some() {
            debug!(target: TX_TARGET, "cancelled pending text for {address}");
        }
        debug!(target: TX_TARGET, "sending {address} {text}");
        match self.transmitter.transmit(&OscMessage::string(address, text)) {
            Ok(()) => {
                self.last_sent.insert(address.to_string(), text.to_string());
                true
            }
            Err(e) => {
                error!("failed to send text to {address}: {e}");
                false
            }
        }
    }

    fn send_trigger(&self, address: &str) -> bool {
        debug!(target: TX_TARGET, "sending {address} {TRIGGER_VALUE}");
        match self.transmitter.transmit(&OscMessage::int(address, TRIGGER_VALUE)) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to send trigger to {address}: {e}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
