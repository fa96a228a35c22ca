//! # Default Switching
//!
//! [`DefaultSwitcher`] repoints the registry's default slot, persists the
//! choice, refreshes the regional configuration derived from the new
//! default's SIM, and broadcasts a [`DefaultSubscriptionChanged`] event.
//!
//! Out-of-range slots and unknown subscriptions are silent no-ops.
//! Persistence and notification failures are logged and never roll back
//! the switch.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{Receiver, Sender};
use telephony_common::{DefaultSubscriptionChanged, SubscriptionId};
use tracing::{debug, info, warn};

use crate::directory::SubscriptionDirectory;
use crate::error::RegistryError;
use crate::registry::SlotRegistry;
use crate::settings::{SettingsStore, keys};

// ── Regional configuration ──────────────────────────────────────────

/// Mobile country / network code of the default SIM's operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionalConfig {
    pub mcc: u16,
    pub mnc: u16,
    /// 2 or 3; `mnc` alone loses leading zeros.
    pub mnc_digits: u8,
}

impl RegionalConfig {
    /// Parse an operator numeric such as `"310260"` or `"23415"`.
    pub fn parse(numeric: &str) -> Option<Self> {
        let numeric = numeric.trim();
        if !(5..=6).contains(&numeric.len()) || !numeric.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (mcc, mnc) = numeric.split_at(3);
        Some(Self {
            mcc: mcc.parse().ok()?,
            mnc: mnc.parse().ok()?,
            mnc_digits: mnc.len() as u8,
        })
    }
}

impl fmt::Display for RegionalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mcc={:03} mnc={:0width$}",
            self.mcc,
            self.mnc,
            width = usize::from(self.mnc_digits)
        )
    }
}

// ── Notifier ────────────────────────────────────────────────────────

/// Sticky fan-out of [`DefaultSubscriptionChanged`] events.
///
/// New subscribers immediately receive the last event. Subscribers whose
/// receiver was dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct Notifier {
    inner: Mutex<NotifierInner>,
}

#[derive(Debug, Default)]
struct NotifierInner {
    subscribers: Vec<Sender<DefaultSubscriptionChanged>>,
    last: Option<DefaultSubscriptionChanged>,
}

impl Notifier {
    pub fn subscribe(&self) -> Receiver<DefaultSubscriptionChanged> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(last) = &inner.last {
            let _ = tx.send(last.clone());
        }
        inner.subscribers.push(tx);
        rx
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: DefaultSubscriptionChanged) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = inner.subscribers.len();
        inner.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let delivered = inner.subscribers.len();
        if delivered < before {
            debug!(dropped = before - delivered, "pruned disconnected subscribers");
        }
        inner.last = Some(event);
        delivered
    }
}

// ── Switcher ────────────────────────────────────────────────────────

pub struct DefaultSwitcher {
    registry: Arc<SlotRegistry>,
    properties: Arc<dyn SettingsStore>,
    directory: Arc<dyn SubscriptionDirectory>,
    notifier: Notifier,
    regional: RwLock<Option<RegionalConfig>>,
    /// Serializes whole switches so events go out in switch order.
    switching: Mutex<()>,
}

impl DefaultSwitcher {
    pub fn new(
        registry: Arc<SlotRegistry>,
        properties: Arc<dyn SettingsStore>,
        directory: Arc<dyn SubscriptionDirectory>,
    ) -> Self {
        Self {
            registry,
            properties,
            directory,
            notifier: Notifier::default(),
            regional: RwLock::new(None),
            switching: Mutex::new(()),
        }
    }

    /// Make `slot` the default.
    ///
    /// `Ok(false)` if `slot` is outside `[0, slot_count)`; nothing is
    /// persisted or announced in that case. Switching to the current default
    /// succeeds again and re-announces it.
    pub fn set_default(&self, slot: i32) -> Result<bool, RegistryError> {
        let _serial = self.switching.lock().unwrap_or_else(|e| e.into_inner());
        let slot_count = self.registry.slot_count()?;
        let slot = match usize::try_from(slot) {
            Ok(s) if s < slot_count => s,
            _ => {
                debug!(slot, slot_count, "ignoring default switch to invalid slot");
                return Ok(false);
            }
        };

        let sub = self.directory.subscription_for_slot(slot);
        self.persist(slot, sub);
        if !self.registry.set_default_slot(slot)? {
            return Ok(false);
        }
        self.refresh_regional(slot);

        let delivered = self.notifier.publish(DefaultSubscriptionChanged::new(slot, sub));
        info!(slot, subscription = ?sub, delivered, "default slot changed");
        Ok(true)
    }

    /// Resolve `sub` to its slot and switch to it. `Ok(false)` if the
    /// subscription is not bound to any slot.
    pub fn set_default_subscription(&self, sub: SubscriptionId) -> Result<bool, RegistryError> {
        match self.directory.slot_for_subscription(sub) {
            Some(slot) => match i32::try_from(slot) {
                Ok(slot) => self.set_default(slot),
                Err(_) => Ok(false),
            },
            None => {
                debug!(%sub, "ignoring default switch to unknown subscription");
                Ok(false)
            }
        }
    }

    /// Refresh regional config and announce the current default without
    /// persisting anything. Called once after bootstrap.
    pub fn announce_current(&self) -> Result<(), RegistryError> {
        let _serial = self.switching.lock().unwrap_or_else(|e| e.into_inner());
        let slot = self.registry.default_slot()?;
        self.refresh_regional(slot);
        let sub = self.directory.subscription_for_slot(slot);
        self.notifier.publish(DefaultSubscriptionChanged::new(slot, sub));
        Ok(())
    }

    pub fn regional_config(&self) -> Option<RegionalConfig> {
        *self.regional.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> Receiver<DefaultSubscriptionChanged> {
        self.notifier.subscribe()
    }

    fn persist(&self, slot: usize, sub: Option<SubscriptionId>) {
        let slot_code = i32::try_from(slot).unwrap_or(i32::MAX);
        if let Err(e) = self.properties.put_int(keys::DEFAULT_SLOT, slot_code) {
            warn!(slot, error = %e, "failed to persist default slot");
        }
        let sub = sub.unwrap_or(SubscriptionId::INVALID);
        if let Err(e) = self.properties.put_int(keys::DEFAULT_SUBSCRIPTION, sub.0) {
            warn!(%sub, error = %e, "failed to persist default subscription");
        }
    }

    fn refresh_regional(&self, slot: usize) {
        let numeric = self.directory.operator_numeric(slot);
        let parsed = numeric.as_deref().and_then(RegionalConfig::parse);
        match (&numeric, parsed) {
            (Some(n), None) => debug!(slot, numeric = %n, "unusable operator numeric, clearing regional config"),
            (_, Some(cfg)) => debug!(slot, %cfg, "regional config updated"),
            (None, None) => debug!(slot, "no operator numeric, clearing regional config"),
        }
        *self.regional.write().unwrap_or_else(|e| e.into_inner()) = parsed;
    }
}

/// Default slot to install at bootstrap.
///
/// Prefers the slot the persisted subscription now sits in, so the default
/// follows a SIM that moved slots. Falls back to the persisted slot, then
/// slot 0. Out-of-range or unparsable values are skipped.
pub fn restore_default_slot(
    properties: &dyn SettingsStore,
    directory: &dyn SubscriptionDirectory,
    slot_count: usize,
) -> usize {
    let in_range = |slot: usize| slot < slot_count;
    let from_sub = properties
        .get_int(keys::DEFAULT_SUBSCRIPTION)
        .map(SubscriptionId)
        .filter(|s| s.is_valid())
        .and_then(|s| directory.slot_for_subscription(s))
        .filter(|s| in_range(*s));
    let from_slot = || {
        properties
            .get_int(keys::DEFAULT_SLOT)
            .and_then(|v| usize::try_from(v).ok())
            .filter(|s| in_range(*s))
    };
    let slot = from_sub.or_else(from_slot).unwrap_or(0);
    debug!(slot, "restored default slot");
    slot
}
