//! # Concurrency stress
//!
//! Many readers against a bootstrapped registry, plus readers racing a
//! default switcher. Readers must only ever see fully installed handles.

use std::sync::{Arc, Barrier};
use std::thread;

use telephony_common::{CdmaSubscriptionSource, OperatingMode, SlotSelector};
use telephony_factory::{
    DefaultSwitcher, DiagnosticLogRegistry, DriverFactory, DriverHandle, DriverSpec, MemorySettings, RegistryError,
    SlotRegistry, StaticDirectory,
};

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
fn hundreds_of_concurrent_gets_see_the_same_handle() {
    const READERS: usize = 256;
    let registry = Arc::new(SlotRegistry::new());
    let installed = handles(2);
    registry.bootstrap(installed.clone(), 0).unwrap();

    let barrier = Arc::new(Barrier::new(READERS));
    let workers: Vec<_> = (0..READERS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get(SlotSelector::Index(0)).unwrap().unwrap()
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), installed[0]);
    }
}

#[test]
fn readers_never_observe_a_partial_registry() {
    const READERS: usize = 64;
    let registry = Arc::new(SlotRegistry::new());
    let barrier = Arc::new(Barrier::new(READERS + 1));

    let workers: Vec<_> = (0..READERS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    match registry.all() {
                        Ok(all) => assert_eq!(all.len(), 3),
                        Err(e) => assert_eq!(e, RegistryError::NotBootstrapped),
                    }
                }
            })
        })
        .collect();

    barrier.wait();
    registry.bootstrap(handles(3), 2).unwrap();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(registry.all().unwrap().len(), 3);
}

#[test]
fn readers_race_default_switches() {
    let registry = Arc::new(SlotRegistry::new());
    let installed = handles(3);
    registry.bootstrap(installed.clone(), 0).unwrap();
    let switcher = Arc::new(DefaultSwitcher::new(
        registry.clone(),
        Arc::new(MemorySettings::new()),
        Arc::new(StaticDirectory::new()),
    ));

    let writer = {
        let switcher = switcher.clone();
        thread::spawn(move || {
            for i in 0..300 {
                switcher.set_default(i % 3).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let installed = installed.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let current = registry.get_default().unwrap();
                    assert!(installed.contains(&current));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.get_default().unwrap(), installed[299 % 3]);
}

#[test]
fn diagnostic_logs_accept_concurrent_appends() {
    let logs = Arc::new(DiagnosticLogRegistry::new());
    logs.register("radio", 50).unwrap();
    let workers: Vec<_> = (0..10)
        .map(|t| {
            let logs = logs.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    logs.append("radio", format!("t{t} line {i}")).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(logs.dump_all()[0].lines.len(), 50);
}
