//! Error taxonomy for the telephony core.
//!
//! Fatal conditions (`StartupConflict`, driver construction failure) are
//! aggregated in [`BootstrapError`] and stop the registry from ever becoming
//! ready. Everything else is local and returned to the immediate caller.
//!
//! Out-of-range slot indices are not errors: lookups return
//! `None` and default switches become no-ops.

use std::path::PathBuf;

use thiserror::Error;

// ── Startup ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("another telephony factory already holds {name:?} after {attempts} attempts")]
    StartupConflict { name: String, attempts: u32 },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no driver registered under {0:?}")]
    UnknownDriver(String),
    #[error("driver {0:?} is already registered")]
    DuplicateDriver(String),
    #[error("driver {driver:?} failed to construct slot {slot}: {source}")]
    Construction {
        driver: String,
        slot: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("driver construction for slot {slot} abandoned after shutdown request")]
    Abandoned { slot: usize },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    StartupConflict(#[from] GuardError),
    #[error(transparent)]
    DriverConstruction(#[from] DriverError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ── Registry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("slot registry has not been bootstrapped")]
    NotBootstrapped,
    #[error("cannot bootstrap a registry with zero slots")]
    Empty,
    #[error("default slot {default_slot} out of range for {slot_count} slots")]
    DefaultOutOfRange { default_slot: usize, slot_count: usize },
}

// ── Diagnostic logs ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("log category {0:?} already present")]
    DuplicateCategory(String),
    #[error("log category {0:?} not found")]
    UnknownCategory(String),
    #[error("log category {0:?} needs a capacity of at least one line")]
    ZeroCapacity(String),
}

// ── Storage & config ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported config version {0}")]
    Version(u32),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
