//! # Bootstrap
//!
//! [`TelephonyFactory`] wires the pieces together and runs the one-time
//! startup sequence:
//!
//! 1. claim the exclusive endpoint (bounded retries, fatal on conflict),
//! 2. read the CDMA subscription source,
//! 3. resolve every slot's mode and construct its driver, all while holding
//!    the registry's write lock,
//! 4. install the snapshot with the restored default slot,
//! 5. announce the default and apply user network mode overrides.
//!
//! Any fatal failure leaves the registry uninitialized and is logged once.

use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::Receiver;
use serde::Serialize;
use telephony_common::{CdmaSubscriptionSource, DefaultSubscriptionChanged, OperatingMode, PhoneType, SlotSelector, SubscriptionId};
use tracing::{debug, error, info, warn};

use crate::config::{FactoryConfig, StorageConfig};
use crate::diag::DiagnosticLogRegistry;
use crate::directory::SubscriptionDirectory;
use crate::driver::{DriverFactory, DriverHandle, DriverSpec};
use crate::dump::{self, DumpInput};
use crate::error::{BootstrapError, RegistryError, SettingsError};
use crate::guard::{ExclusiveEndpoint, ExclusivityGuard};
use crate::mode::ModeResolver;
use crate::prefs::MultiSimPrefs;
use crate::registry::SlotRegistry;
use crate::settings::{FileSettings, MemorySettings, SettingsStore, keys};
use crate::switcher::{DefaultSwitcher, RegionalConfig, restore_default_slot};

/// Diagnostic log categories the factory writes to.
pub const BOOTSTRAP_LOG: &str = "bootstrap";
pub const DEFAULT_LOG: &str = "default_switch";
const LOG_CAPACITY: usize = 64;

// ── Collaborators ───────────────────────────────────────────────────

/// External stores the factory reads and writes.
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsStore>,
    /// Durable properties such as the persisted default slot.
    pub properties: Arc<dyn SettingsStore>,
    pub directory: Arc<dyn SubscriptionDirectory>,
}

impl Collaborators {
    pub fn in_memory(directory: Arc<dyn SubscriptionDirectory>) -> Self {
        Self {
            settings: Arc::new(MemorySettings::new()),
            properties: Arc::new(MemorySettings::new()),
            directory,
        }
    }

    /// File-backed stores where configured, in-memory otherwise.
    ///
    /// Both stores rewrite their whole file on every put, so a path named
    /// for both gets one shared store instead of two that clobber each other.
    pub fn open(storage: &StorageConfig, directory: Arc<dyn SubscriptionDirectory>) -> Result<Self, SettingsError> {
        let open = |path: &Option<std::path::PathBuf>| -> Result<Arc<dyn SettingsStore>, SettingsError> {
            Ok(match path {
                Some(p) => {
                    let store = FileSettings::open(p)?;
                    debug!(path = %store.path().display(), keys = store.snapshot().len(), "opened file-backed store");
                    Arc::new(store) as Arc<dyn SettingsStore>
                }
                None => Arc::new(MemorySettings::new()) as Arc<dyn SettingsStore>,
            })
        };
        let settings = open(&storage.settings_path)?;
        let properties = match (&storage.settings_path, &storage.properties_path) {
            (Some(a), Some(b)) if a == b => {
                warn!(path = %a.display(), "settings and properties share one file");
                settings.clone()
            }
            _ => open(&storage.properties_path)?,
        };
        Ok(Self {
            settings,
            properties,
            directory,
        })
    }
}

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub slot: usize,
    pub mode: OperatingMode,
    pub phone_type: PhoneType,
}

/// What a successful bootstrap produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub guard_attempts: u32,
    pub strategy: &'static str,
    pub subscription_source: CdmaSubscriptionSource,
    pub slots: Vec<SlotReport>,
    pub paired: Vec<SlotReport>,
    pub default_slot: usize,
    pub overrides_applied: usize,
}

// ── Factory ─────────────────────────────────────────────────────────

pub struct TelephonyFactory {
    config: FactoryConfig,
    drivers: DriverFactory,
    settings: Arc<dyn SettingsStore>,
    properties: Arc<dyn SettingsStore>,
    directory: Arc<dyn SubscriptionDirectory>,
    registry: Arc<SlotRegistry>,
    switcher: DefaultSwitcher,
    logs: DiagnosticLogRegistry,
    prefs: MultiSimPrefs,
    paired: RwLock<Vec<DriverHandle>>,
    report: RwLock<Option<BootstrapReport>>,
    /// Held for the process lifetime once claimed.
    instance_lock: Mutex<Option<Box<dyn Send>>>,
    bootstrapping: Mutex<()>,
}

impl TelephonyFactory {
    pub fn new(config: FactoryConfig, drivers: DriverFactory, collaborators: Collaborators) -> Self {
        let Collaborators {
            settings,
            properties,
            directory,
        } = collaborators;
        let registry = Arc::new(SlotRegistry::new());
        let logs = DiagnosticLogRegistry::new();
        for name in [BOOTSTRAP_LOG, DEFAULT_LOG] {
            if let Err(e) = logs.register(name, LOG_CAPACITY) {
                warn!(error = %e, "diagnostic log category not registered");
            }
        }
        Self {
            drivers: drivers.lte_on_cdma(config.lte_on_cdma),
            switcher: DefaultSwitcher::new(registry.clone(), properties.clone(), directory.clone()),
            prefs: MultiSimPrefs::new(settings.clone()),
            config,
            settings,
            properties,
            directory,
            registry,
            logs,
            paired: RwLock::new(Vec::new()),
            report: RwLock::new(None),
            instance_lock: Mutex::new(None),
            bootstrapping: Mutex::new(()),
        }
    }

    /// Bootstrap using the configured host-wide endpoint.
    pub fn bootstrap(&self, shutdown: &Receiver<()>) -> Result<BootstrapReport, BootstrapError> {
        let guard = ExclusivityGuard::from_config(&self.config.guard);
        self.bootstrap_with(&guard, shutdown)
    }

    /// Run the startup sequence once. Later calls return the first report.
    ///
    /// `shutdown` only matters under the blocking failure policy, where it
    /// releases a bootstrap thread parked on a construction failure.
    pub fn bootstrap_with<E>(
        &self,
        guard: &ExclusivityGuard<E>,
        shutdown: &Receiver<()>,
    ) -> Result<BootstrapReport, BootstrapError>
    where
        E: ExclusiveEndpoint,
        E::Claim: 'static,
    {
        let _serial = self.bootstrapping.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(report) = self.report.read().unwrap_or_else(|e| e.into_inner()).clone() {
            debug!("telephony factory already bootstrapped");
            return Ok(report);
        }

        let result = self.run(guard, shutdown);
        match &result {
            Ok(report) => {
                self.diag(
                    BOOTSTRAP_LOG,
                    format!(
                        "ready: {} slots, default {}, {} overrides",
                        report.slots.len(),
                        report.default_slot,
                        report.overrides_applied
                    ),
                );
                *self.report.write().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());
            }
            Err(e) => {
                let cause = match e {
                    BootstrapError::StartupConflict(_) => "startup conflict",
                    BootstrapError::DriverConstruction(_) => "driver construction failure",
                    BootstrapError::Registry(_) => "invalid registry snapshot",
                };
                error!(cause, error = %e, "telephony bootstrap failed");
                self.diag(BOOTSTRAP_LOG, format!("failed: {e}"));
            }
        }
        result
    }

    fn run<E>(&self, guard: &ExclusivityGuard<E>, shutdown: &Receiver<()>) -> Result<BootstrapReport, BootstrapError>
    where
        E: ExclusiveEndpoint,
        E::Claim: 'static,
    {
        let lock = guard.acquire()?;
        let guard_attempts = lock.attempts();
        self.diag(BOOTSTRAP_LOG, format!("claimed {:?} after {} attempt(s)", lock.name(), guard_attempts));

        let subscription_source = self.subscription_source();
        let resolver = ModeResolver::from_config(&self.config, self.settings.clone(), self.directory.clone());
        info!(
            slot_count = self.config.slot_count,
            driver = %self.config.driver,
            strategy = resolver.strategy_name(),
            cdma_subscription = %subscription_source,
            "bootstrapping telephony factory"
        );

        let mut paired = Vec::new();
        let installed = self.registry.initialize_with(|| -> Result<_, BootstrapError> {
            let slot_count = self.config.slot_count;
            let mut handles = Vec::with_capacity(slot_count);
            for (slot, mode) in resolver.resolve_all().into_iter().enumerate() {
                handles.push(self.construct(slot, mode, subscription_source, shutdown)?);
            }
            for slot in 0..slot_count {
                if let Some(mode) = resolver.resolve_paired(slot) {
                    paired.push(self.construct(slot_count + slot, mode, subscription_source, shutdown)?);
                }
            }
            let default_slot = restore_default_slot(self.properties.as_ref(), self.directory.as_ref(), slot_count);
            Ok((handles, default_slot))
        })?;
        if !installed {
            warn!("slot registry was populated outside bootstrap, keeping its drivers");
            self.diag(BOOTSTRAP_LOG, "registry already populated, construction skipped".to_string());
        }
        let default_slot = self.registry.default_slot()?;

        *self.instance_lock.lock().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(lock) as Box<dyn Send>);
        *self.paired.write().unwrap_or_else(|e| e.into_inner()) = paired.clone();

        self.switcher.announce_current()?;
        let handles = self.registry.all()?;
        let overrides_applied = self.apply_user_overrides(&handles);

        Ok(BootstrapReport {
            guard_attempts,
            strategy: resolver.strategy_name(),
            subscription_source,
            slots: handles.iter().enumerate().map(|(slot, h)| slot_report(slot, h)).collect(),
            paired: paired.iter().map(|h| slot_report(h.instance(), h)).collect(),
            default_slot,
            overrides_applied,
        })
    }

    fn construct(
        &self,
        instance: usize,
        mode: OperatingMode,
        subscription_source: CdmaSubscriptionSource,
        shutdown: &Receiver<()>,
    ) -> Result<DriverHandle, BootstrapError> {
        let spec = DriverSpec {
            instance,
            mode,
            subscription_source,
        };
        let handle = self
            .drivers
            .construct_with_policy(&self.config.driver, &spec, self.config.on_failure, shutdown)?;
        self.diag(BOOTSTRAP_LOG, format!("instance {instance}: {} {mode}", self.config.driver));
        Ok(handle)
    }

    fn subscription_source(&self) -> CdmaSubscriptionSource {
        let Some(code) = self.settings.get_int(keys::CDMA_SUBSCRIPTION_MODE) else {
            return CdmaSubscriptionSource::default();
        };
        CdmaSubscriptionSource::from_code(code).unwrap_or_else(|e| {
            debug!(error = %e, "unknown CDMA subscription source, using default");
            CdmaSubscriptionSource::default()
        })
    }

    /// Apply each slot's user network mode where it differs from the mode
    /// the slot was constructed with.
    fn apply_user_overrides(&self, handles: &[DriverHandle]) -> usize {
        let mut applied = 0;
        for (slot, handle) in handles.iter().enumerate() {
            let Some(sub) = self.directory.subscription_for_slot(slot) else {
                continue;
            };
            let Some(user) = self.directory.user_network_mode(sub) else {
                continue;
            };
            let current = handle.driver().mode();
            if user == current {
                continue;
            }
            match handle.driver().set_preferred_mode(user) {
                Ok(()) => {
                    info!(slot, %sub, from = %current, to = %user, "applied user network mode");
                    applied += 1;
                }
                Err(e) => warn!(slot, %sub, mode = %user, error = %e, "user network mode rejected"),
            }
        }
        applied
    }

    fn diag(&self, category: &str, line: String) {
        if let Err(e) = self.logs.append(category, line) {
            debug!(error = %e, "diagnostic log append failed");
        }
    }

    // ── Public surface ──────────────────────────────────────────────

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SlotRegistry> {
        &self.registry
    }

    pub fn is_ready(&self) -> bool {
        self.registry.is_ready()
    }

    /// True once bootstrap has claimed the exclusive endpoint.
    pub fn holds_instance_lock(&self) -> bool {
        self.instance_lock.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn report(&self) -> Option<BootstrapReport> {
        self.report.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get_default(&self) -> Result<DriverHandle, RegistryError> {
        self.registry.get_default()
    }

    pub fn get(&self, selector: SlotSelector) -> Result<Option<DriverHandle>, RegistryError> {
        self.registry.get(selector)
    }

    pub fn all(&self) -> Result<Vec<DriverHandle>, RegistryError> {
        self.registry.all()
    }

    /// Paired-path drivers on dual-connection hardware; empty otherwise.
    pub fn paired(&self) -> Vec<DriverHandle> {
        self.paired.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_default(&self, slot: i32) -> Result<bool, RegistryError> {
        let switched = self.switcher.set_default(slot)?;
        if switched {
            self.diag(DEFAULT_LOG, format!("default -> slot {slot}"));
        }
        Ok(switched)
    }

    pub fn set_default_subscription(&self, sub: SubscriptionId) -> Result<bool, RegistryError> {
        let switched = self.switcher.set_default_subscription(sub)?;
        if switched {
            self.diag(DEFAULT_LOG, format!("default -> {sub}"));
        }
        Ok(switched)
    }

    pub fn subscribe(&self) -> Receiver<DefaultSubscriptionChanged> {
        self.switcher.subscribe()
    }

    pub fn regional_config(&self) -> Option<RegionalConfig> {
        self.switcher.regional_config()
    }

    pub fn prefs(&self) -> &MultiSimPrefs {
        &self.prefs
    }

    pub fn logs(&self) -> &DiagnosticLogRegistry {
        &self.logs
    }

    pub fn dump(&self) -> String {
        let paired = self.paired();
        dump::render(&DumpInput {
            config: &self.config,
            registry: &self.registry,
            paired: &paired,
            regional: self.regional_config(),
            logs: &self.logs,
        })
    }
}

fn slot_report(slot: usize, handle: &DriverHandle) -> SlotReport {
    SlotReport {
        slot,
        mode: handle.driver().mode(),
        phone_type: handle.phone_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FailurePolicy, ModeVariant};
    use crate::directory::StaticDirectory;
    use crate::error::GuardError;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Free;

    impl ExclusiveEndpoint for Free {
        type Claim = ();

        fn name(&self) -> &str {
            "free"
        }

        fn try_claim(&self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Busy;

    impl ExclusiveEndpoint for Busy {
        type Claim = ();

        fn name(&self) -> &str {
            "busy"
        }

        fn try_claim(&self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::AddrInUse, "held elsewhere"))
        }
    }

    fn free() -> ExclusivityGuard<Free> {
        ExclusivityGuard::new(Free, 0, Duration::ZERO)
    }

    fn shutdown() -> Receiver<()> {
        crossbeam_channel::never()
    }

    fn two_slots() -> FactoryConfig {
        FactoryConfig {
            slot_count: 2,
            lte_on_gsm: true,
            ..FactoryConfig::default()
        }
    }

    #[test]
    fn bootstrap_builds_every_slot() {
        let dir = Arc::new(StaticDirectory::new().with_subscription(0, SubscriptionId(1)));
        let factory = TelephonyFactory::new(two_slots(), DriverFactory::with_builtin(), Collaborators::in_memory(dir));
        let report = factory.bootstrap_with(&free(), &shutdown()).unwrap();

        assert_eq!(report.strategy, "standard");
        assert_eq!(report.slots[0].mode, OperatingMode::LteGsmWcdma);
        assert_eq!(report.slots[1].mode, OperatingMode::GsmOnly);
        assert_eq!(report.default_slot, 0);
        assert!(report.paired.is_empty());
        assert!(factory.holds_instance_lock());
        assert_eq!(factory.all().unwrap().len(), 2);
        assert_eq!(factory.subscribe().try_recv().unwrap().subscription, Some(SubscriptionId(1)));
    }

    #[test]
    fn second_bootstrap_is_a_noop() {
        let factory = TelephonyFactory::new(
            two_slots(),
            DriverFactory::with_builtin(),
            Collaborators::in_memory(Arc::new(StaticDirectory::new())),
        );
        let first = factory.bootstrap_with(&free(), &shutdown()).unwrap();
        let before = factory.all().unwrap();
        // A busy guard proves the second call never reaches acquisition.
        let busy = ExclusivityGuard::new(Busy, 0, Duration::ZERO);
        assert_eq!(factory.bootstrap_with(&busy, &shutdown()).unwrap(), first);
        assert_eq!(factory.all().unwrap(), before);
    }

    #[test]
    fn conflict_is_fatal_and_leaves_registry_uninitialized() {
        let factory = TelephonyFactory::new(
            two_slots(),
            DriverFactory::with_builtin(),
            Collaborators::in_memory(Arc::new(StaticDirectory::new())),
        );
        let busy = ExclusivityGuard::new(Busy, 2, Duration::ZERO);
        let err = factory.bootstrap_with(&busy, &shutdown()).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::StartupConflict(GuardError::StartupConflict { attempts: 3, .. })
        ));
        assert!(!factory.is_ready());
        assert_eq!(factory.get_default().unwrap_err(), RegistryError::NotBootstrapped);
        assert!(factory.dump().contains("failed: another telephony factory"));
    }

    #[test]
    fn construction_failure_never_exposes_partial_registry() {
        static BUILT: AtomicU32 = AtomicU32::new(0);
        let mut drivers = DriverFactory::with_builtin();
        drivers
            .register("FlakyRil", |spec| {
                if spec.instance == 1 {
                    anyhow::bail!("modem did not answer");
                }
                BUILT.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(crate::driver::RilDriver::new(spec)) as Arc<dyn crate::driver::RadioDriver>)
            })
            .unwrap();
        let config = FactoryConfig {
            driver: "FlakyRil".into(),
            ..two_slots()
        };
        let factory = TelephonyFactory::new(config, drivers, Collaborators::in_memory(Arc::new(StaticDirectory::new())));
        let err = factory.bootstrap_with(&free(), &shutdown()).unwrap_err();
        assert!(matches!(err, BootstrapError::DriverConstruction(_)));
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert!(!factory.is_ready());
        assert_eq!(factory.all().unwrap_err(), RegistryError::NotBootstrapped);
    }

    #[test]
    fn blocked_construction_is_released_by_shutdown() {
        let config = FactoryConfig {
            driver: "Missing".into(),
            on_failure: FailurePolicy::Block {
                log_interval: Duration::from_millis(5),
            },
            ..two_slots()
        };
        let factory = TelephonyFactory::new(
            config,
            DriverFactory::with_builtin(),
            Collaborators::in_memory(Arc::new(StaticDirectory::new())),
        );
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(tx);
        let err = factory.bootstrap_with(&free(), &rx).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::DriverConstruction(crate::error::DriverError::Abandoned { slot: 0 })
        ));
    }

    #[test]
    fn restores_persisted_default_and_subscription_source() {
        let dir = Arc::new(
            StaticDirectory::new()
                .with_subscription(0, SubscriptionId(1))
                .with_subscription(1, SubscriptionId(2)),
        );
        let collaborators = Collaborators {
            settings: Arc::new(MemorySettings::new().with(keys::CDMA_SUBSCRIPTION_MODE, 0)),
            properties: Arc::new(MemorySettings::new().with(keys::DEFAULT_SUBSCRIPTION, 2)),
            directory: dir,
        };
        let factory = TelephonyFactory::new(two_slots(), DriverFactory::with_builtin(), collaborators);
        let report = factory.bootstrap_with(&free(), &shutdown()).unwrap();
        assert_eq!(report.default_slot, 1);
        assert_eq!(report.subscription_source, CdmaSubscriptionSource::RuimSim);
        assert_eq!(factory.get_default().unwrap(), factory.get(SlotSelector::Index(1)).unwrap().unwrap());
    }

    #[test]
    fn user_override_pass_reaches_non_capability_slots() {
        let dir = Arc::new(
            StaticDirectory::new()
                .with_subscription(1, SubscriptionId(2))
                .with_user_mode(1, OperatingMode::WcdmaOnly),
        );
        let factory = TelephonyFactory::new(two_slots(), DriverFactory::with_builtin(), Collaborators::in_memory(dir));
        let report = factory.bootstrap_with(&free(), &shutdown()).unwrap();
        assert_eq!(report.overrides_applied, 1);
        assert_eq!(report.slots[1].mode, OperatingMode::WcdmaOnly);
    }

    #[test]
    fn dual_connection_builds_paired_paths() {
        let config = FactoryConfig {
            variant: ModeVariant::DualConnection,
            ..two_slots()
        };
        let factory = TelephonyFactory::new(
            config,
            DriverFactory::with_builtin(),
            Collaborators::in_memory(Arc::new(StaticDirectory::new())),
        );
        let report = factory.bootstrap_with(&free(), &shutdown()).unwrap();
        let ids: Vec<_> = report.paired.iter().map(|p| p.slot).collect();
        assert_eq!(ids, [2, 3]);
        assert_eq!(report.paired[0].mode, OperatingMode::LteGsmWcdma);
        assert!(factory.dump().contains("paired path 3"));
    }

    #[test]
    fn report_reflects_registry_populated_beforehand() {
        let factory = TelephonyFactory::new(
            two_slots(),
            DriverFactory::with_builtin(),
            Collaborators::in_memory(Arc::new(StaticDirectory::new())),
        );
        let drivers = DriverFactory::with_builtin();
        let handles: Vec<_> = (0..3)
            .map(|instance| {
                drivers
                    .construct(
                        "RIL",
                        &DriverSpec {
                            instance,
                            mode: OperatingMode::WcdmaOnly,
                            subscription_source: CdmaSubscriptionSource::Nv,
                        },
                    )
                    .unwrap()
            })
            .collect();
        assert!(factory.registry().bootstrap(handles.clone(), 2).unwrap());

        let report = factory.bootstrap_with(&free(), &shutdown()).unwrap();
        assert_eq!(report.default_slot, 2);
        assert_eq!(report.slots.len(), 3);
        assert!(report.slots.iter().all(|s| s.mode == OperatingMode::WcdmaOnly));
        assert_eq!(factory.all().unwrap(), handles);
        assert!(factory.dump().contains("construction skipped"));
    }

    #[test]
    fn shared_storage_path_opens_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let storage = StorageConfig {
            settings_path: Some(path.clone()),
            properties_path: Some(path.clone()),
        };
        let collaborators = Collaborators::open(&storage, Arc::new(StaticDirectory::new())).unwrap();
        collaborators.settings.put_int("preferred_network_mode.sub1", 9).unwrap();
        collaborators.properties.put_int(keys::DEFAULT_SLOT, 1).unwrap();

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(reopened.get_int("preferred_network_mode.sub1"), Some(9));
        assert_eq!(reopened.get_int(keys::DEFAULT_SLOT), Some(1));
    }

    #[test]
    fn real_endpoint_conflicts_between_factories() {
        let mut config = two_slots();
        config.guard.name = format!("telephony-factory-test-bootstrap-{}", std::process::id());
        config.guard.max_retries = 1;
        config.guard.retry_delay = Duration::from_millis(1);
        let make = || {
            TelephonyFactory::new(
                config.clone(),
                DriverFactory::with_builtin(),
                Collaborators::in_memory(Arc::new(StaticDirectory::new())),
            )
        };
        let first = make();
        first.bootstrap(&shutdown()).unwrap();
        let second = make();
        assert!(matches!(
            second.bootstrap(&shutdown()),
            Err(BootstrapError::StartupConflict(_))
        ));
    }
}
