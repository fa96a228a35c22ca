use telephony_common::OperatingMode;
use tracing::debug;

use super::standard::stored_mode;
use super::{ModeContext, ModeStrategy};
use crate::settings::keys;

/// Slot whose stored preference cannot be read back on dual-technology
/// hardware; it always runs GSM-only.
pub const GSM_PINNED_SLOT: usize = 1;

/// Dual-technology EVDO (C+G) hardware.
///
/// Each slot uses its own stored per-slot preference, falling back to the
/// base preference. The capability-slot policy does not apply, but slot
/// [`GSM_PINNED_SLOT`] is always forced to GSM-only.
pub struct EvdoDualTechnologyStrategy;

impl ModeStrategy for EvdoDualTechnologyStrategy {
    fn name(&self) -> &'static str {
        "evdo_dual_technology"
    }

    fn resolve(&self, slot: usize, ctx: &ModeContext<'_>) -> OperatingMode {
        if slot == GSM_PINNED_SLOT {
            return OperatingMode::GsmOnly;
        }
        let mode = stored_mode(ctx.settings, &keys::preferred_mode_for_slot(slot))
            .unwrap_or(ctx.base_preference);
        debug!(slot, %mode, "evdo dual-technology mode");
        mode
    }
}
