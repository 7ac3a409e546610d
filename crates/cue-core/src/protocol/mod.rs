//! Protocol module containing the stage display JSON messages and the OSC codec.

pub mod osc;
pub mod stage_display;

pub use osc::{decode_message, encode_message, OscArg, OscError, OscMessage};
pub use stage_display::{FieldValue, LayoutRef, StageEvent, StageRequest, PROTOCOL_VERSION};
