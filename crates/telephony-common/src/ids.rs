//! Subscription identifiers and slot selectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one subscription (SIM profile) as assigned by the
/// subscription directory. Unrelated to slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub i32);

impl SubscriptionId {
    /// Sentinel returned by settings-backed getters when nothing is stored.
    pub const INVALID: SubscriptionId = SubscriptionId(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub{}", self.0)
    }
}

/// Which slot a registry lookup refers to.
///
/// Concrete indices are signed: callers historically probe with negative or
/// too-large values and expect an empty answer rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSelector {
    Default,
    Index(i32),
}

impl SlotSelector {
    /// Raw index callers use to mean "the default slot".
    pub const DEFAULT_RAW: i32 = i32::MAX;

    pub fn from_raw(raw: i32) -> Self {
        if raw == Self::DEFAULT_RAW {
            SlotSelector::Default
        } else {
            SlotSelector::Index(raw)
        }
    }
}

impl From<usize> for SlotSelector {
    fn from(slot: usize) -> Self {
        SlotSelector::Index(i32::try_from(slot).unwrap_or(i32::MIN))
    }
}

impl fmt::Display for SlotSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotSelector::Default => write!(f, "default"),
            SlotSelector::Index(i) => write!(f, "{i}"),
        }
    }
}
