//! # Slot Registry
//!
//! Owns the per-slot driver handles and the default-slot pointer.
//!
//! The registry is either `Uninitialized` or `Ready`; readers never observe
//! anything in between. A `Ready` snapshot is assembled off to the side and
//! installed in a single write, while the write lock is held for the whole
//! population step so no reader can sneak in.
//!
//! Lookups of a slot index outside `[0, slot_count)` return `Ok(None)`;
//! every lookup before bootstrap returns [`RegistryError::NotBootstrapped`].

use std::sync::RwLock;

use telephony_common::SlotSelector;
use tracing::{debug, info};

use crate::driver::DriverHandle;
use crate::error::RegistryError;

#[derive(Debug)]
enum State {
    Uninitialized,
    Ready(Snapshot),
}

#[derive(Debug)]
struct Snapshot {
    handles: Vec<DriverHandle>,
    default_slot: usize,
}

impl Snapshot {
    fn build(handles: Vec<DriverHandle>, default_slot: usize) -> Result<Self, RegistryError> {
        if handles.is_empty() {
            return Err(RegistryError::Empty);
        }
        if default_slot >= handles.len() {
            return Err(RegistryError::DefaultOutOfRange {
                default_slot,
                slot_count: handles.len(),
            });
        }
        Ok(Self {
            handles,
            default_slot,
        })
    }

    fn index(&self, raw: i32) -> Option<&DriverHandle> {
        usize::try_from(raw).ok().and_then(|i| self.handles.get(i))
    }
}

#[derive(Debug)]
pub struct SlotRegistry {
    state: RwLock<State>,
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Uninitialized),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.read(), State::Ready(_))
    }

    /// Install the full handle sequence and default slot.
    ///
    /// The slot count is `handles.len()`. Returns `Ok(false)` without touching
    /// anything if the registry is already ready.
    pub fn bootstrap(&self, handles: Vec<DriverHandle>, default_slot: usize) -> Result<bool, RegistryError> {
        self.initialize_with(|| Ok::<_, RegistryError>((handles, default_slot)))
    }

    /// Run `populate` under the write lock and install what it returns.
    ///
    /// `populate` is only invoked while uninitialized. If it fails, the
    /// registry stays uninitialized and the error is returned unchanged.
    pub fn initialize_with<F, E>(&self, populate: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<(Vec<DriverHandle>, usize), E>,
        E: From<RegistryError>,
    {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let State::Ready(_) = *state {
            debug!("slot registry already bootstrapped");
            return Ok(false);
        }
        let (handles, default_slot) = populate()?;
        let snapshot = Snapshot::build(handles, default_slot)?;
        info!(
            slot_count = snapshot.handles.len(),
            default_slot = snapshot.default_slot,
            "slot registry ready"
        );
        *state = State::Ready(snapshot);
        Ok(true)
    }

    pub fn get_default(&self) -> Result<DriverHandle, RegistryError> {
        match &*self.read() {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) => Ok(s.handles[s.default_slot].clone()),
        }
    }

    pub fn get(&self, selector: SlotSelector) -> Result<Option<DriverHandle>, RegistryError> {
        match &*self.read() {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) => Ok(match selector {
                SlotSelector::Default => Some(s.handles[s.default_slot].clone()),
                SlotSelector::Index(raw) => s.index(raw).cloned(),
            }),
        }
    }

    pub fn all(&self) -> Result<Vec<DriverHandle>, RegistryError> {
        match &*self.read() {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) => Ok(s.handles.clone()),
        }
    }

    pub fn slot_count(&self) -> Result<usize, RegistryError> {
        match &*self.read() {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) => Ok(s.handles.len()),
        }
    }

    pub fn default_slot(&self) -> Result<usize, RegistryError> {
        match &*self.read() {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) => Ok(s.default_slot),
        }
    }

    /// Repoint the default. `Ok(false)` for an out-of-range slot.
    pub(crate) fn set_default_slot(&self, slot: usize) -> Result<bool, RegistryError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match &mut *state {
            State::Uninitialized => Err(RegistryError::NotBootstrapped),
            State::Ready(s) if slot < s.handles.len() => {
                s.default_slot = slot;
                Ok(true)
            }
            State::Ready(_) => Ok(false),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverFactory, DriverSpec};
    use telephony_common::{CdmaSubscriptionSource, OperatingMode};

    fn handles(n: usize) -> Vec<DriverHandle> {
        let factory = DriverFactory::with_builtin();
        (0..n)
            .map(|instance| {
                factory
                    .construct(
                        "RIL",
                        &DriverSpec {
                            instance,
                            mode: OperatingMode::GsmOnly,
                            subscription_source: CdmaSubscriptionSource::Nv,
                        },
                    )
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn everything_fails_before_bootstrap() {
        let reg = SlotRegistry::new();
        assert!(!reg.is_ready());
        assert_eq!(reg.get_default().unwrap_err(), RegistryError::NotBootstrapped);
        assert_eq!(reg.get(SlotSelector::Index(0)).unwrap_err(), RegistryError::NotBootstrapped);
        assert_eq!(reg.get(SlotSelector::Default).unwrap_err(), RegistryError::NotBootstrapped);
        assert_eq!(reg.all().unwrap_err(), RegistryError::NotBootstrapped);
        assert_eq!(reg.set_default_slot(0).unwrap_err(), RegistryError::NotBootstrapped);
    }

    #[test]
    fn bootstrap_installs_snapshot_once() {
        let reg = SlotRegistry::new();
        let first = handles(2);
        assert!(reg.bootstrap(first.clone(), 1).unwrap());
        assert!(!reg.bootstrap(handles(3), 0).unwrap());

        assert_eq!(reg.all().unwrap(), first);
        assert_eq!(reg.slot_count().unwrap(), 2);
        assert_eq!(reg.get_default().unwrap(), first[1]);
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let reg = SlotRegistry::new();
        reg.bootstrap(handles(2), 0).unwrap();
        assert_eq!(reg.get(SlotSelector::Index(2)).unwrap(), None);
        assert_eq!(reg.get(SlotSelector::Index(-1)).unwrap(), None);
        assert!(reg.get(SlotSelector::Index(1)).unwrap().is_some());
    }

    #[test]
    fn invalid_snapshots_are_rejected() {
        let reg = SlotRegistry::new();
        assert_eq!(reg.bootstrap(Vec::new(), 0).unwrap_err(), RegistryError::Empty);
        assert_eq!(
            reg.bootstrap(handles(2), 2).unwrap_err(),
            RegistryError::DefaultOutOfRange {
                default_slot: 2,
                slot_count: 2
            }
        );
        assert!(!reg.is_ready());
    }

    #[test]
    fn failed_population_leaves_registry_uninitialized() {
        let reg = SlotRegistry::new();
        let res: Result<bool, RegistryError> = reg.initialize_with(|| Err(RegistryError::Empty));
        assert!(res.is_err());
        assert!(!reg.is_ready());
        assert!(reg.bootstrap(handles(1), 0).unwrap());
    }

    #[test]
    fn repoint_default() {
        let reg = SlotRegistry::new();
        let hs = handles(3);
        reg.bootstrap(hs.clone(), 0).unwrap();
        assert!(reg.set_default_slot(2).unwrap());
        assert!(!reg.set_default_slot(3).unwrap());
        assert_eq!(reg.default_slot().unwrap(), 2);
        assert_eq!(reg.get(SlotSelector::Default).unwrap(), Some(hs[2].clone()));
    }
}
