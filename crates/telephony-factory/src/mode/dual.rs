use telephony_common::OperatingMode;

use super::standard::StandardStrategy;
use super::{ModeContext, ModeStrategy};

/// Logical radio path on dual-connection hardware.
///
/// Each physical slot `s` is paired with a second LTE path whose logical id
/// is `slot_count + s`. Both halves of a pair share the physical slot's
/// capability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalSlot {
    Physical(usize),
    Paired(usize),
}

impl LogicalSlot {
    /// `None` for ids outside `[0, 2 * slot_count)`.
    pub fn from_id(id: usize, slot_count: usize) -> Option<Self> {
        if id < slot_count {
            Some(LogicalSlot::Physical(id))
        } else if id < slot_count * 2 {
            Some(LogicalSlot::Paired(id - slot_count))
        } else {
            None
        }
    }

    pub fn physical_slot(self) -> usize {
        match self {
            LogicalSlot::Physical(s) | LogicalSlot::Paired(s) => s,
        }
    }

    pub fn id(self, slot_count: usize) -> usize {
        match self {
            LogicalSlot::Physical(s) => s,
            LogicalSlot::Paired(s) => slot_count + s,
        }
    }
}

/// SVLTE-style hardware that virtualizes two logical paths per slot.
pub struct DualConnectionStrategy;

impl DualConnectionStrategy {
    /// Mode for a logical path id; `None` if the id maps to no slot.
    pub fn resolve_logical(&self, id: usize, ctx: &ModeContext<'_>) -> Option<OperatingMode> {
        let logical = LogicalSlot::from_id(id, ctx.slot_count)?;
        Some(self.resolve(logical.physical_slot(), ctx))
    }
}

impl ModeStrategy for DualConnectionStrategy {
    fn name(&self) -> &'static str {
        "dual_connection"
    }

    fn resolve(&self, slot: usize, ctx: &ModeContext<'_>) -> OperatingMode {
        if slot == ctx.capability_slot {
            StandardStrategy::capability_mode(slot, ctx)
        } else {
            OperatingMode::FALLBACK
        }
    }

    fn paired_path(&self, slot: usize, ctx: &ModeContext<'_>) -> Option<OperatingMode> {
        self.resolve_logical(LogicalSlot::Paired(slot).id(ctx.slot_count), ctx)
    }
}
