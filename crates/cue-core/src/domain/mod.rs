//! Domain layer: pure routing rules and output address modelling.
//!
//! Nothing in here performs I/O or reads the clock, so every rule can be
//! tested with plain values.

pub mod address;
pub mod routing;

pub use address::{AddressError, AddressGroup, GroupSlot, OutputGroups};
pub use routing::{normalize_text, select_text_pair, TextPair};
