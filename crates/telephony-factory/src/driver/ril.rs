use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use telephony_common::{CdmaSubscriptionSource, OperatingMode};
use tracing::info;

use super::{DriverSpec, RadioDriver};

/// Canonical radio interface driver, registered as `"RIL"`.
///
/// Tracks the requested network mode; the radio socket protocol lives
/// behind it and is not modelled here.
#[derive(Debug)]
pub struct RilDriver {
    instance: usize,
    subscription_source: CdmaSubscriptionSource,
    created_at: DateTime<Utc>,
    state: Mutex<RilState>,
}

#[derive(Debug)]
struct RilState {
    mode: OperatingMode,
    mode_changes: u32,
}

impl RilDriver {
    pub const NAME: &'static str = "RIL";

    pub fn new(spec: &DriverSpec) -> Self {
        info!(
            instance = spec.instance,
            mode = %spec.mode,
            cdma_subscription = %spec.subscription_source,
            "RIL instance created"
        );
        Self {
            instance: spec.instance,
            subscription_source: spec.subscription_source,
            created_at: Utc::now(),
            state: Mutex::new(RilState {
                mode: spec.mode,
                mode_changes: 0,
            }),
        }
    }
}

impl RadioDriver for RilDriver {
    fn driver_name(&self) -> &str {
        Self::NAME
    }

    fn instance(&self) -> usize {
        self.instance
    }

    fn mode(&self) -> OperatingMode {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).mode
    }

    fn subscription_source(&self) -> CdmaSubscriptionSource {
        self.subscription_source
    }

    fn set_preferred_mode(&self, mode: OperatingMode) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.mode != mode {
            info!(instance = self.instance, from = %state.mode, to = %mode, "RIL network mode change");
            state.mode = mode;
            state.mode_changes += 1;
        }
        Ok(())
    }

    fn dump(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "RIL[{}]:", self.instance)?;
        writeln!(out, "  mode: {}", state.mode)?;
        writeln!(out, "  mode changes: {}", state.mode_changes)?;
        writeln!(out, "  cdma subscription: {}", self.subscription_source)?;
        writeln!(out, "  created: {}", self.created_at.to_rfc3339())
    }
}
