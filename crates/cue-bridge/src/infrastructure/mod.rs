//! Infrastructure layer for cue-bridge.
//!
//! The infrastructure layer handles all I/O: the WebSocket connection to the
//! presentation tool, the UDP socket towards the OSC receiver, config files,
//! and the event loop that ties them to the application layer.
//!
//! # What does NOT belong here?
//!
//! - Deciding which request answers which message (that is the session)
//! - Deciding where and when text is published (that is the scheduler)
//! - Command-line parsing (that is done in `main.rs`)

pub mod bridge_loop;
pub mod config_file;
pub mod osc_udp;
pub mod stage_conn;

pub use bridge_loop::run_bridge;
pub use config_file::{load_file_config, ConfigError, FileConfig};
