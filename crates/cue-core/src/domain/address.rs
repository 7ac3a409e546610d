//! Output address groups.
//!
//! An [`AddressGroup`] is an ordered list of OSC addresses treated as one
//! logical output: the first address (the *primary*) receives the slide text,
//! every following address (a *secondary*) receives an integer trigger pulse.
//!
//! The bridge publishes to one group, or alternates between two of them so
//! that the receiving application can cross-fade between two text layers.
//!
//! ```text
//! group A: /layers/1/text  /layers/1/connect  /layers/1/opacity-kick
//!          └── primary ──┘ └────────────── secondaries ─────────────┘
//! group B: /layers/2/text  /layers/2/connect
//! ```

use std::fmt;

use thiserror::Error;

/// Error type for address group validation.
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    /// A group was configured with no addresses at all.
    #[error("address group must contain at least one address")]
    EmptyGroup,

    /// An address does not look like an OSC address pattern.
    #[error("invalid OSC address {0:?}: must start with '/'")]
    InvalidAddress(String),
}

/// An ordered, non-empty list of OSC addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressGroup {
    addresses: Vec<String>,
}

impl AddressGroup {
    /// Validates and builds a group.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::EmptyGroup`] for an empty list and
    /// [`AddressError::InvalidAddress`] for the first entry that does not
    /// start with `/`.
    pub fn new<I, S>(addresses: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
        if addresses.is_empty() {
            return Err(AddressError::EmptyGroup);
        }
        if let Some(bad) = addresses.iter().find(|a| !a.starts_with('/')) {
            return Err(AddressError::InvalidAddress(bad.clone()));
        }
        Ok(Self { addresses })
    }

    /// The address that receives the text.
    pub fn primary(&self) -> &str {
        // Non-empty by construction.
        &self.addresses[0]
    }

    /// The addresses that receive a trigger pulse, in configured order.
    pub fn secondaries(&self) -> &[String] {
        &self.addresses[1..]
    }
}

/// Which of the two configured groups a route selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSlot {
    A,
    B,
}

impl GroupSlot {
    /// 1-based index used in log output (`TEXT (1): ...`).
    pub fn index(self) -> u8 {
        match self {
            GroupSlot::A => 1,
            GroupSlot::B => 2,
        }
    }

    pub fn other(self) -> GroupSlot {
        match self {
            GroupSlot::A => GroupSlot::B,
            GroupSlot::B => GroupSlot::A,
        }
    }
}

impl fmt::Display for GroupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// The configured output groups: group A always, group B optionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputGroups {
    group_a: AddressGroup,
    group_b: Option<AddressGroup>,
}

impl OutputGroups {
    /// A single-group configuration; alternation is a no-op.
    pub fn single(group_a: AddressGroup) -> Self {
        Self {
            group_a,
            group_b: None,
        }
    }

    /// A two-group configuration; routes alternate A, B, A, ...
    pub fn alternating(group_a: AddressGroup, group_b: AddressGroup) -> Self {
        Self {
            group_a,
            group_b: Some(group_b),
        }
    }

    pub fn is_alternating(&self) -> bool {
        self.group_b.is_some()
    }

    /// Returns the group in `slot`, or `None` for [`GroupSlot::B`] when only
    /// one group is configured.
    pub fn get(&self, slot: GroupSlot) -> Option<&AddressGroup> {
        match slot {
            GroupSlot::A => Some(&self.group_a),
            GroupSlot::B => self.group_b.as_ref(),
        }
    }

    /// Like [`OutputGroups::get`], falling back to group A.
    pub fn resolve(&self, slot: GroupSlot) -> &AddressGroup {
        self.get(slot).unwrap_or(&self.group_a)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
