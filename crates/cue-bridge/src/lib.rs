//! cue-bridge library crate.
//!
//! This crate keeps a connection to a presentation tool's stage display
//! interface and republishes the slide text it receives as OSC messages.
//!
//! # Architecture
//!
//! ```text
//! Presentation tool (JSON over WebSocket)
//!         ↓
//! [cue-bridge]
//!   ├── domain/           BridgeConfig and its parts
//!   ├── application/
//!   │     ├── session/    connect / authenticate / subscribe state machine
//!   │     └── scheduler/  group alternation, delayed sends, trigger pulses
//!   └── infrastructure/
//!         ├── stage_conn/  WebSocket client (tokio-tungstenite)
//!         ├── osc_udp/     UDP datagram transmitter
//!         ├── config_file/ TOML / JSON config loading
//!         └── bridge_loop/ the single event loop tying it all together
//!         ↓
//! Lighting / VJ application (OSC over UDP)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `cue-core` only; it never touches a
//!   socket or reads the clock.  Time is passed in, sends go through the
//!   [`application::scheduler::OscTransmitter`] trait.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: session state machine and output scheduler.
pub mod application;

/// Infrastructure layer: sockets, config files, and the event loop.
pub mod infrastructure;
