//! # Telephony Factory Daemon
//!
//! Loads the factory configuration, bootstraps the slot registry and then
//! idles, logging slot status periodically until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: one slot, RIL driver, in-memory settings
//! telephony-factoryd
//!
//! # Two slots, capability on the second, print the dump and exit
//! telephony-factoryd --config factory.toml --slots 2 --capability-slot 2 --dump
//! ```
//!
//! The daemon binds slot `n` to subscription `n + 1` in its simulated
//! subscription directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use telephony_common::{DefaultSubscriptionChanged, SlotSelector, SubscriptionId};
use telephony_factory::{Collaborators, DriverFactory, FactoryConfig, StaticDirectory, TelephonyFactory};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "telephony-factoryd", about = "Telephony bootstrap daemon")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of slots.
    #[arg(long)]
    slots: Option<usize>,

    /// Override the driver selection key.
    #[arg(long)]
    driver: Option<String>,

    /// Override the capability slot (1-based).
    #[arg(long)]
    capability_slot: Option<usize>,

    /// Operator numeric (MCC+MNC) for the SIM in each slot, in slot order.
    #[arg(long, value_delimiter = ',')]
    operators: Vec<String>,

    /// Seconds between status log lines.
    #[arg(long, default_value_t = 30)]
    status_interval: u64,

    /// Print the diagnostic dump after bootstrap and exit.
    #[arg(long, default_value_t = false)]
    dump: bool,
}

fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!(
        slots = config.slot_count,
        driver = %config.driver,
        capability_slot = config.capability_slot,
        variant = ?config.variant,
        "telephony-factoryd starting"
    );

    // ── Collaborators ───────────────────────────────────────────
    let mut directory = StaticDirectory::new();
    for slot in 0..config.slot_count {
        let sub = i32::try_from(slot + 1).map(SubscriptionId).unwrap_or(SubscriptionId::INVALID);
        directory = directory.with_subscription(slot, sub);
        if let Some(numeric) = cli.operators.get(slot) {
            directory = directory.with_operator(slot, numeric.clone());
        }
    }
    let collaborators = Collaborators::open(&config.storage, Arc::new(directory))?;

    // ── Graceful shutdown ───────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        tracing::info!("shutting down...");
        let _ = shutdown_tx.try_send(());
    })?;

    // ── Bootstrap ───────────────────────────────────────────────
    let drivers = DriverFactory::with_builtin();
    tracing::debug!(drivers = ?drivers.names().collect::<Vec<_>>(), "registered driver constructors");
    let factory = TelephonyFactory::new(config, drivers, collaborators);
    let report = factory.bootstrap(&shutdown_rx)?;
    tracing::info!(
        default_slot = report.default_slot,
        strategy = report.strategy,
        guard_attempts = report.guard_attempts,
        overrides = report.overrides_applied,
        "telephony factory ready"
    );

    if cli.dump {
        print!("{}", factory.dump());
        return Ok(());
    }

    // ── Status loop ─────────────────────────────────────────────
    let events = factory.subscribe();
    let interval = Duration::from_secs(cli.status_interval.max(1));
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                log_events(&events);
                log_status(&factory);
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("telephony-factoryd stopped");
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<FactoryConfig> {
    let mut config = match &cli.config {
        Some(path) => FactoryConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => FactoryConfig::default(),
    };
    if let Some(slots) = cli.slots {
        anyhow::ensure!(slots >= 1, "--slots must be at least 1");
        config.slot_count = slots;
    }
    if let Some(driver) = cli.driver.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        config.driver = driver.to_string();
    }
    if let Some(capability_slot) = cli.capability_slot {
        anyhow::ensure!(capability_slot >= 1, "--capability-slot is 1-based");
        config.capability_slot = capability_slot - 1;
    }
    Ok(config)
}

fn log_events(events: &Receiver<DefaultSubscriptionChanged>) {
    for event in events.try_iter() {
        match event.to_json() {
            Ok(json) => tracing::info!(event = %json, "default subscription changed"),
            Err(e) => tracing::warn!(error = %e, "unencodable default change event"),
        }
    }
}

fn log_status(factory: &TelephonyFactory) {
    let default_slot = match factory.registry().default_slot() {
        Ok(slot) => slot,
        Err(e) => {
            tracing::warn!(error = %e, "factory not ready");
            return;
        }
    };
    for slot in 0..factory.config().slot_count {
        if let Ok(Some(handle)) = factory.get(SlotSelector::from(slot)) {
            tracing::info!(
                slot,
                mode = %handle.driver().mode(),
                phone_type = %handle.phone_type(),
                default = default_slot == slot,
                "slot status"
            );
        }
    }
    let prefs = factory.prefs();
    tracing::info!(
        default_slot,
        regional = ?factory.regional_config().map(|r| r.to_string()),
        voice = %prefs.voice_subscription(),
        sms = %prefs.sms_subscription(),
        data = %prefs.data_subscription(),
        "factory status"
    );
}
