//! Narrow view of the subscription controller.
//!
//! The factory only needs to map slots to subscriptions and back, read a
//! subscription's user network mode, and look up the operator numeric of
//! the SIM in a slot. Persistence of subscriptions lives elsewhere.

use std::collections::HashMap;
use std::sync::RwLock;

use telephony_common::{OperatingMode, SubscriptionId};

pub trait SubscriptionDirectory: Send + Sync {
    /// Active subscription bound to `slot`, if any.
    fn subscription_for_slot(&self, slot: usize) -> Option<SubscriptionId>;

    fn slot_for_subscription(&self, sub: SubscriptionId) -> Option<usize>;

    /// Mode the user picked for this subscription. `None` means "unset".
    fn user_network_mode(&self, sub: SubscriptionId) -> Option<OperatingMode>;

    /// MCC+MNC of the SIM in `slot`, e.g. `"310260"`.
    fn operator_numeric(&self, slot: usize) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
struct Entry {
    sub: Option<SubscriptionId>,
    user_mode: Option<OperatingMode>,
    operator: Option<String>,
}

/// In-process directory with a fixed slot layout.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    slots: RwLock<HashMap<usize, Entry>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(self, slot: usize, sub: SubscriptionId) -> Self {
        self.update(slot, |e| e.sub = Some(sub));
        self
    }

    pub fn with_user_mode(self, slot: usize, mode: OperatingMode) -> Self {
        self.update(slot, |e| e.user_mode = Some(mode));
        self
    }

    pub fn with_operator(self, slot: usize, numeric: impl Into<String>) -> Self {
        let numeric = numeric.into();
        self.update(slot, |e| e.operator = Some(numeric));
        self
    }

    /// Change the user network mode at runtime.
    pub fn set_user_mode(&self, slot: usize, mode: Option<OperatingMode>) {
        self.update(slot, |e| e.user_mode = mode);
    }

    fn update(&self, slot: usize, f: impl FnOnce(&mut Entry)) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        f(slots.entry(slot).or_default());
    }
}

impl SubscriptionDirectory for StaticDirectory {
    fn subscription_for_slot(&self, slot: usize) -> Option<SubscriptionId> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(&slot).and_then(|e| e.sub)
    }

    fn slot_for_subscription(&self, sub: SubscriptionId) -> Option<usize> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .iter()
            .filter(|(_, e)| e.sub == Some(sub))
            .map(|(slot, _)| *slot)
            .min()
    }

    fn user_network_mode(&self, sub: SubscriptionId) -> Option<OperatingMode> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .values()
            .find(|e| e.sub == Some(sub))
            .and_then(|e| e.user_mode)
    }

    fn operator_numeric(&self, slot: usize) -> Option<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(&slot).and_then(|e| e.operator.clone())
    }
}
