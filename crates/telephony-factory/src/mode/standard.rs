use telephony_common::{OperatingMode, SubscriptionId};
use tracing::{debug, warn};

use super::{ModeContext, ModeStrategy, resolve_mode};
use crate::settings::{SettingsStore, keys};

/// Capability-slot policy with per-subscription storage and user override.
pub struct StandardStrategy;

pub(super) fn stored_mode(settings: &dyn SettingsStore, key: &str) -> Option<OperatingMode> {
    let code = settings.get_int(key)?;
    match OperatingMode::from_code(code) {
        Ok(mode) => Some(mode),
        Err(e) => {
            debug!(key, error = %e, "ignoring stored network mode");
            None
        }
    }
}

impl StandardStrategy {
    /// Preferred mode for the capability slot, persisting a user override
    /// back to the subscription's stored preference.
    pub(super) fn capability_mode(slot: usize, ctx: &ModeContext<'_>) -> OperatingMode {
        let sub = ctx.directory.subscription_for_slot(slot);
        let stored = sub.and_then(|s| stored_mode(ctx.settings, &keys::preferred_mode_for_subscription(s)));
        let user = sub.and_then(|s| ctx.directory.user_network_mode(s));

        let resolution = resolve_mode(slot, ctx.capability_slot, ctx.base_preference, stored, user);
        if resolution.user_override_applied {
            if let Some(sub) = sub {
                persist(ctx.settings, sub, resolution.mode);
            }
        }
        resolution.mode
    }
}

fn persist(settings: &dyn SettingsStore, sub: SubscriptionId, mode: OperatingMode) {
    let key = keys::preferred_mode_for_subscription(sub);
    match settings.put_int(&key, mode.code()) {
        Ok(()) => debug!(%sub, %mode, "persisted user network mode override"),
        Err(e) => warn!(%sub, %mode, error = %e, "failed to persist user network mode override"),
    }
}

impl ModeStrategy for StandardStrategy {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn resolve(&self, slot: usize, ctx: &ModeContext<'_>) -> OperatingMode {
        if slot == ctx.capability_slot {
            Self::capability_mode(slot, ctx)
        } else {
            OperatingMode::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{StaticDirectory, SubscriptionDirectory};
    use crate::settings::MemorySettings;

    fn ctx<'a>(
        settings: &'a dyn SettingsStore,
        directory: &'a dyn SubscriptionDirectory,
    ) -> ModeContext<'a> {
        ModeContext {
            slot_count: 2,
            capability_slot: 0,
            base_preference: OperatingMode::LteGsmWcdma,
            settings,
            directory,
        }
    }

    #[test]
    fn no_stored_value_yields_base() {
        let settings = MemorySettings::new();
        let dir = StaticDirectory::new().with_subscription(0, SubscriptionId(1));
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(0, &c), OperatingMode::LteGsmWcdma);
        assert_eq!(StandardStrategy.resolve(1, &c), OperatingMode::GsmOnly);
    }

    #[test]
    fn stored_subscription_mode_wins_over_base() {
        let settings = MemorySettings::new().with("preferred_network_mode.sub1", 7);
        let dir = StaticDirectory::new().with_subscription(0, SubscriptionId(1));
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(0, &c), OperatingMode::Global);
    }

    #[test]
    fn stored_value_ignored_on_non_capability_slot() {
        let settings = MemorySettings::new().with("preferred_network_mode.sub2", 7);
        let dir = StaticDirectory::new().with_subscription(1, SubscriptionId(2));
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(1, &c), OperatingMode::GsmOnly);
    }

    #[test]
    fn user_override_is_applied_and_persisted() {
        let settings = MemorySettings::new();
        let dir = StaticDirectory::new()
            .with_subscription(0, SubscriptionId(1))
            .with_user_mode(0, OperatingMode::LteOnly);
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(0, &c), OperatingMode::LteOnly);
        assert_eq!(
            settings.get_int("preferred_network_mode.sub1"),
            Some(OperatingMode::LteOnly.code())
        );
    }

    #[test]
    fn garbage_stored_value_falls_back_to_base() {
        let settings = MemorySettings::new().with("preferred_network_mode.sub1", 404);
        let dir = StaticDirectory::new().with_subscription(0, SubscriptionId(1));
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(0, &c), OperatingMode::LteGsmWcdma);
    }

    #[test]
    fn slot_without_subscription_uses_base() {
        let settings = MemorySettings::new();
        let dir = StaticDirectory::new();
        let c = ctx(&settings, &dir);
        assert_eq!(StandardStrategy.resolve(0, &c), OperatingMode::LteGsmWcdma);
        assert!(settings.snapshot().is_empty());
    }
}
