//! # Telephony Factory
//!
//! Bootstrap-and-registry core of a telephony stack. At startup it makes
//! sure only one instance runs on the host, computes each radio slot's
//! operating mode, constructs one radio interface driver per slot and
//! publishes them through a thread-safe [`SlotRegistry`]. Afterwards the
//! process-wide default slot can be switched at runtime.
//!
//! ## Modules
//!
//! - [`guard`]: host-wide single-instance claim with bounded retry
//! - [`mode`]: layered operating-mode resolution per hardware variant
//! - [`driver`]: named driver constructors and opaque handles
//! - [`registry`]: `Uninitialized -> Ready` slot registry
//! - [`switcher`]: default switching, regional config, notifications
//! - [`diag`]: named bounded logs for dumps
//! - [`bootstrap`]: the startup sequence tying it together

pub mod bootstrap;
pub mod config;
pub mod diag;
pub mod directory;
pub mod driver;
pub mod dump;
pub mod error;
pub mod guard;
pub mod mode;
pub mod prefs;
pub mod registry;
pub mod settings;
pub mod switcher;

pub use bootstrap::{BootstrapReport, Collaborators, SlotReport, TelephonyFactory};
pub use config::{FactoryConfig, FailurePolicy, ModeVariant};
pub use diag::DiagnosticLogRegistry;
pub use directory::{StaticDirectory, SubscriptionDirectory};
pub use driver::{DriverFactory, DriverHandle, DriverSpec, RadioDriver};
pub use error::{BootstrapError, ConfigError, DriverError, GuardError, LogError, RegistryError, SettingsError};
pub use guard::{ExclusiveEndpoint, ExclusivityGuard, LocalEndpoint};
pub use mode::ModeResolver;
pub use registry::SlotRegistry;
pub use settings::{FileSettings, MemorySettings, SettingsStore};
pub use switcher::{DefaultSwitcher, RegionalConfig};
