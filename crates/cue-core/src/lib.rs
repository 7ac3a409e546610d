//! # cue-core
//!
//! Shared library for cue-bridge containing the two wire protocols the bridge
//! speaks and the pure routing rules that connect them.
//!
//! This crate has zero dependencies on sockets, async runtimes, or timers.
//!
//! # Architecture overview
//!
//! cue-bridge listens to a presentation tool's *stage display* interface (the
//! feed that normally drives a confidence monitor) and republishes the current
//! slide text as OSC messages to a lighting / VJ application.
//!
//! - **`protocol`** – How bytes travel on each side.  `stage_display` holds the
//!   JSON messages exchanged over the WebSocket; `osc` encodes and decodes the
//!   OSC 1.0 datagrams sent over UDP.
//!
//! - **`domain`** – Pure rules with no I/O.  `routing` picks the text to show
//!   out of a field-value update; `address` models the validated groups of
//!   OSC addresses the text is published to.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `cue_core::TextPair` instead of `cue_core::domain::routing::TextPair`.
pub use domain::address::{AddressError, AddressGroup, GroupSlot, OutputGroups};
pub use domain::routing::{normalize_text, select_text_pair, TextPair};
pub use protocol::osc::{decode_message, encode_message, OscArg, OscError, OscMessage};
pub use protocol::stage_display::{FieldValue, StageEvent, StageRequest};
