//! # Mode Resolution
//!
//! Computes each slot's initial operating mode from layered configuration:
//!
//! 1. the base preference (configured default, LTE-on-CDMA / LTE-on-GSM),
//! 2. a stored per-subscription (or per-slot) preference,
//! 3. the user's network mode for the subscription,
//! 4. the capability-slot policy: only one slot may get the preferred mode,
//!    every other slot is forced to [`OperatingMode::FALLBACK`].
//!
//! The layering itself is the pure function [`resolve_mode`]. Strategies
//! gather its inputs from the settings store and subscription directory,
//! and differ per hardware variant (see [`ModeVariant`]).

mod dual;
mod evdo;
mod standard;

use std::sync::Arc;

use telephony_common::OperatingMode;

pub use dual::{DualConnectionStrategy, LogicalSlot};
pub use evdo::EvdoDualTechnologyStrategy;
pub use standard::StandardStrategy;

use crate::config::{FactoryConfig, ModeVariant};
use crate::directory::SubscriptionDirectory;
use crate::settings::SettingsStore;

/// Outcome of the preferred-mode computation for the capability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub mode: OperatingMode,
    /// The user's override replaced the stored/base value; callers should
    /// write `mode` back to the per-subscription store.
    pub user_override_applied: bool,
}

impl Resolution {
    fn plain(mode: OperatingMode) -> Self {
        Self {
            mode,
            user_override_applied: false,
        }
    }
}

/// Stored preference if present, else the base, then the user override if
/// it is set and differs.
pub fn preferred_mode(
    base_preference: OperatingMode,
    stored: Option<OperatingMode>,
    user_override: Option<OperatingMode>,
) -> Resolution {
    let computed = stored.unwrap_or(base_preference);
    match user_override {
        Some(user) if user != computed => Resolution {
            mode: user,
            user_override_applied: true,
        },
        _ => Resolution::plain(computed),
    }
}

/// Capability-slot policy over [`preferred_mode`].
///
/// Any slot other than `capability_slot` gets the fallback mode regardless
/// of stored settings or user overrides.
pub fn resolve_mode(
    slot: usize,
    capability_slot: usize,
    base_preference: OperatingMode,
    stored: Option<OperatingMode>,
    user_override: Option<OperatingMode>,
) -> Resolution {
    if slot == capability_slot {
        preferred_mode(base_preference, stored, user_override)
    } else {
        Resolution::plain(OperatingMode::FALLBACK)
    }
}

/// Everything a strategy may consult.
pub struct ModeContext<'a> {
    pub slot_count: usize,
    pub capability_slot: usize,
    pub base_preference: OperatingMode,
    pub settings: &'a dyn SettingsStore,
    pub directory: &'a dyn SubscriptionDirectory,
}

/// Per-variant mode computation.
pub trait ModeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, slot: usize, ctx: &ModeContext<'_>) -> OperatingMode;

    /// Mode of the second radio path paired with `slot`, on hardware that
    /// has one.
    fn paired_path(&self, _slot: usize, _ctx: &ModeContext<'_>) -> Option<OperatingMode> {
        None
    }
}

/// Strategy selected once from configuration plus the stores it reads.
pub struct ModeResolver {
    strategy: Box<dyn ModeStrategy>,
    slot_count: usize,
    capability_slot: usize,
    base_preference: OperatingMode,
    settings: Arc<dyn SettingsStore>,
    directory: Arc<dyn SubscriptionDirectory>,
}

impl ModeResolver {
    pub fn new(
        strategy: Box<dyn ModeStrategy>,
        config: &FactoryConfig,
        settings: Arc<dyn SettingsStore>,
        directory: Arc<dyn SubscriptionDirectory>,
    ) -> Self {
        Self {
            strategy,
            slot_count: config.slot_count,
            capability_slot: config.capability_slot,
            base_preference: config.base_preference(),
            settings,
            directory,
        }
    }

    pub fn from_config(
        config: &FactoryConfig,
        settings: Arc<dyn SettingsStore>,
        directory: Arc<dyn SubscriptionDirectory>,
    ) -> Self {
        Self::new(strategy_for(config.variant), config, settings, directory)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    fn context(&self) -> ModeContext<'_> {
        ModeContext {
            slot_count: self.slot_count,
            capability_slot: self.capability_slot,
            base_preference: self.base_preference,
            settings: self.settings.as_ref(),
            directory: self.directory.as_ref(),
        }
    }

    pub fn resolve(&self, slot: usize) -> OperatingMode {
        self.strategy.resolve(slot, &self.context())
    }

    /// `None` unless the variant pairs each slot with a second path.
    pub fn resolve_paired(&self, slot: usize) -> Option<OperatingMode> {
        if slot >= self.slot_count {
            return None;
        }
        self.strategy.paired_path(slot, &self.context())
    }

    pub fn resolve_all(&self) -> Vec<OperatingMode> {
        (0..self.slot_count).map(|slot| self.resolve(slot)).collect()
    }
}

pub fn strategy_for(variant: ModeVariant) -> Box<dyn ModeStrategy> {
    match variant {
        ModeVariant::Standard => Box::new(StandardStrategy),
        ModeVariant::EvdoDualTechnology => Box::new(EvdoDualTechnologyStrategy),
        ModeVariant::DualConnection => Box::new(DualConnectionStrategy),
    }
}
