//! Domain layer for cue-bridge.
//!
//! Holds the runtime configuration.  The routing rules themselves live in
//! `cue-core` because they are shared with its tests and benchmarks.

pub mod config;

pub use config::{BridgeConfig, LogToggles, OscConfig, ScheduleDelays, StageDisplayConfig};
