use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, error, info};

use super::{DriverHandle, DriverSpec, RadioDriver, RilDriver};
use crate::config::FailurePolicy;
use crate::error::DriverError;

/// Constructor registered under a driver name.
pub type DriverConstructor =
    Arc<dyn Fn(&DriverSpec) -> anyhow::Result<Arc<dyn RadioDriver>> + Send + Sync>;

/// Name → constructor table used to build one driver per slot.
///
/// Names are matched after trimming surrounding whitespace. Every failure
/// mode (unknown name, constructor error, constructor panic) surfaces as a
/// [`DriverError`] so bootstrap can treat them identically.
#[derive(Clone, Default)]
pub struct DriverFactory {
    constructors: BTreeMap<String, DriverConstructor>,
    lte_on_cdma: bool,
}

impl DriverFactory {
    /// Empty table; nothing can be constructed until something is registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the canonical [`RilDriver`] registered as `"RIL"`.
    pub fn with_builtin() -> Self {
        let mut factory = Self::empty();
        factory.constructors.insert(
            RilDriver::NAME.to_string(),
            Arc::new(|spec: &DriverSpec| Ok(Arc::new(RilDriver::new(spec)) as Arc<dyn RadioDriver>)),
        );
        factory
    }

    /// Phone type derivation for constructed handles: on LTE-on-CDMA
    /// devices LTE-only modes count as CDMA.
    pub fn lte_on_cdma(mut self, lte_on_cdma: bool) -> Self {
        self.lte_on_cdma = lte_on_cdma;
        self
    }

    pub fn register<F>(&mut self, name: &str, constructor: F) -> Result<(), DriverError>
    where
        F: Fn(&DriverSpec) -> anyhow::Result<Arc<dyn RadioDriver>> + Send + Sync + 'static,
    {
        let name = name.trim();
        if self.constructors.contains_key(name) {
            return Err(DriverError::DuplicateDriver(name.to_string()));
        }
        self.constructors.insert(name.to_string(), Arc::new(constructor));
        debug!(driver = name, "driver registered");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name.trim())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build one driver. Also used to rebuild a single path with an explicit
    /// mode, e.g. the paired LTE path on dual-connection hardware.
    pub fn construct(&self, name: &str, spec: &DriverSpec) -> Result<DriverHandle, DriverError> {
        let name = name.trim();
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| DriverError::UnknownDriver(name.to_string()))?;

        let built = panic::catch_unwind(AssertUnwindSafe(|| constructor(spec))).unwrap_or_else(
            |payload| Err(anyhow::anyhow!("constructor panicked: {}", panic_message(payload.as_ref()))),
        );

        match built {
            Ok(driver) => {
                let phone_type = spec.mode.phone_type(self.lte_on_cdma);
                info!(
                    driver = name,
                    instance = spec.instance,
                    mode = %spec.mode,
                    ?phone_type,
                    "driver constructed"
                );
                Ok(DriverHandle::new(driver, phone_type))
            }
            Err(source) => Err(DriverError::Construction {
                driver: name.to_string(),
                slot: spec.instance,
                source,
            }),
        }
    }

    /// [`construct`](Self::construct) plus the configured failure policy.
    ///
    /// Under [`FailurePolicy::Block`] a failure parks the calling thread and
    /// repeats the error log every interval. No further construction is
    /// attempted; the call returns [`DriverError::Abandoned`] once `shutdown`
    /// fires or its sender is dropped.
    pub fn construct_with_policy(
        &self,
        name: &str,
        spec: &DriverSpec,
        policy: FailurePolicy,
        shutdown: &Receiver<()>,
    ) -> Result<DriverHandle, DriverError> {
        let err = match self.construct(name, spec) {
            Ok(handle) => return Ok(handle),
            Err(e) => e,
        };
        match policy {
            FailurePolicy::Abort => Err(err),
            FailurePolicy::Block { log_interval } => {
                let mut reports: u64 = 0;
                loop {
                    reports += 1;
                    error!(
                        slot = spec.instance,
                        reports,
                        error = %err,
                        "driver construction failed; radio stack unusable, waiting for shutdown"
                    );
                    match shutdown.recv_timeout(log_interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            return Err(DriverError::Abandoned { slot: spec.instance });
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Debug for DriverFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverFactory")
            .field("drivers", &self.constructors.keys().collect::<Vec<_>>())
            .field("lte_on_cdma", &self.lte_on_cdma)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
