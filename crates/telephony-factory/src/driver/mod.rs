//! # Radio Interface Drivers
//!
//! One driver instance is constructed per slot at bootstrap. Drivers are
//! pluggable: the configuration names one, and [`DriverFactory`] maps that
//! name to a registered constructor. The core never looks inside a driver;
//! it only holds opaque [`DriverHandle`]s.

mod factory;
mod ril;

use std::fmt;
use std::sync::Arc;

use telephony_common::{CdmaSubscriptionSource, OperatingMode, PhoneType};

pub use factory::{DriverConstructor, DriverFactory};
pub use ril::RilDriver;

/// Arguments every driver constructor receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSpec {
    /// Instance id: the slot index, or a paired-path id on dual-connection
    /// hardware.
    pub instance: usize,
    pub mode: OperatingMode,
    pub subscription_source: CdmaSubscriptionSource,
}

/// A constructed radio interface driver.
///
/// Implementations use interior mutability; the registry only ever hands
/// out shared references.
pub trait RadioDriver: Send + Sync + fmt::Debug {
    fn driver_name(&self) -> &str;

    fn instance(&self) -> usize;

    fn mode(&self) -> OperatingMode;

    fn subscription_source(&self) -> CdmaSubscriptionSource;

    /// Ask the radio to switch network mode.
    fn set_preferred_mode(&self, mode: OperatingMode) -> anyhow::Result<()>;

    /// Free-form state for the diagnostic dump.
    fn dump(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// Opaque, cheaply clonable reference to one constructed driver.
///
/// Equality is identity: two handles are equal only if they point at the
/// same driver instance.
#[derive(Clone)]
pub struct DriverHandle {
    driver: Arc<dyn RadioDriver>,
    phone_type: PhoneType,
}

impl DriverHandle {
    pub fn new(driver: Arc<dyn RadioDriver>, phone_type: PhoneType) -> Self {
        Self { driver, phone_type }
    }

    pub fn driver(&self) -> &dyn RadioDriver {
        self.driver.as_ref()
    }

    pub fn instance(&self) -> usize {
        self.driver.instance()
    }

    pub fn phone_type(&self) -> PhoneType {
        self.phone_type
    }
}

impl PartialEq for DriverHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.driver, &other.driver)
    }
}

impl Eq for DriverHandle {}

impl fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverHandle")
            .field("driver", &self.driver.driver_name())
            .field("instance", &self.driver.instance())
            .field("phone_type", &self.phone_type)
            .finish()
    }
}
