//! Application layer for cue-bridge.
//!
//! The application layer decides *what* happens on each event: which request
//! answers which stage display message, which group a slide goes to, and when
//! each datagram is due.  It delegates *how* bytes move to the infrastructure
//! layer.
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or resolving host names (that is infrastructure)
//! - Reading the clock or sleeping (callers pass `Instant`s in)
//! - Tokio task spawning

pub mod scheduler;
pub mod session;

pub use scheduler::{OscTransmitter, OutputScheduler, RouteOutcome, TransmitError};
pub use session::{Session, SessionAction, SessionState, TransportEvent, TransportFailure};
