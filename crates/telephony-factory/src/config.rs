use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use telephony_common::OperatingMode;

use crate::error::ConfigError;

pub const CONFIG_VERSION: u32 = 1;

/// Driver selection key used when the config does not name one.
pub const DEFAULT_DRIVER: &str = "RIL";

/// Well-known name of the host-wide exclusive endpoint.
pub const DEFAULT_GUARD_NAME: &str = "telephony-factory";

// ── Raw input ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactoryConfigInput {
    pub version: u32,
    pub slot_count: Option<usize>,
    pub driver: Option<String>,
    /// 1-based, as operators write it.
    pub capability_slot: Option<usize>,
    pub variant: Option<ModeVariant>,
    pub default_network_mode: Option<ModeInput>,
    pub lte_on_cdma: bool,
    pub lte_on_gsm: bool,
    pub guard: GuardConfigInput,
    pub construction: ConstructionConfigInput,
    pub storage: StorageConfigInput,
}

/// A network mode written either as its numeric code or its name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModeInput {
    Code(i32),
    Name(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GuardConfigInput {
    pub name: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstructionConfigInput {
    pub on_failure: Option<FailurePolicyInput>,
    pub block_log_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicyInput {
    Abort,
    Block,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfigInput {
    pub settings_path: Option<PathBuf>,
    pub properties_path: Option<PathBuf>,
}

// ── Resolved config ─────────────────────────────────────────────────

/// Which mode-resolution strategy the hardware needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeVariant {
    #[default]
    Standard,
    /// Dual-technology EVDO hardware (C+G phones).
    EvdoDualTechnology,
    /// SVLTE-style hardware that pairs each slot with a second LTE path.
    DualConnection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub name: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GUARD_NAME.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(2000),
        }
    }
}

/// What bootstrap does when a driver cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return a fatal error and leave the registry uninitialized.
    #[default]
    Abort,
    /// Park the bootstrap thread, logging the failure every `log_interval`,
    /// until shutdown is requested.
    Block { log_interval: Duration },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub settings_path: Option<PathBuf>,
    pub properties_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    pub version: u32,
    pub slot_count: usize,
    pub driver: String,
    /// 0-based.
    pub capability_slot: usize,
    pub variant: ModeVariant,
    pub default_network_mode: OperatingMode,
    pub lte_on_cdma: bool,
    pub lte_on_gsm: bool,
    pub guard: GuardConfig,
    pub on_failure: FailurePolicy,
    pub storage: StorageConfig,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            slot_count: 1,
            driver: DEFAULT_DRIVER.to_string(),
            capability_slot: 0,
            variant: ModeVariant::Standard,
            default_network_mode: OperatingMode::DEFAULT_PREFERRED,
            lte_on_cdma: false,
            lte_on_gsm: false,
            guard: GuardConfig::default(),
            on_failure: FailurePolicy::Abort,
            storage: StorageConfig::default(),
        }
    }
}

impl FactoryConfig {
    /// Base preference before any per-slot policy: the configured default,
    /// replaced by GLOBAL on LTE-on-CDMA devices and by LTE/GSM/WCDMA on
    /// LTE-on-GSM devices (the latter wins when both are set).
    pub fn base_preference(&self) -> OperatingMode {
        let mut mode = self.default_network_mode;
        if self.lte_on_cdma {
            mode = OperatingMode::Global;
        }
        if self.lte_on_gsm {
            mode = OperatingMode::LteGsmWcdma;
        }
        mode
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(FactoryConfig::default());
        }
        let parsed: FactoryConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl FactoryConfigInput {
    pub fn resolve(self) -> Result<FactoryConfig, ConfigError> {
        let defaults = FactoryConfig::default();

        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::Version(version));
        }

        let slot_count = self.slot_count.unwrap_or(defaults.slot_count);
        if slot_count == 0 {
            return Err(ConfigError::Invalid("slot_count must be at least 1".into()));
        }

        let driver = self
            .driver
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or(defaults.driver);

        let capability_slot = match self.capability_slot {
            None => defaults.capability_slot,
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "capability_slot is 1-based; 0 is not a slot".into(),
                ));
            }
            Some(one_based) => one_based - 1,
        };

        let default_network_mode = match self.default_network_mode {
            None => defaults.default_network_mode,
            Some(ModeInput::Code(code)) => OperatingMode::from_code(code)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            Some(ModeInput::Name(name)) => name
                .parse()
                .map_err(|e: telephony_common::ModeError| ConfigError::Invalid(e.to_string()))?,
        };

        let guard = GuardConfig {
            name: self
                .guard
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(defaults.guard.name),
            max_retries: self.guard.max_retries.unwrap_or(defaults.guard.max_retries),
            retry_delay: self
                .guard
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.guard.retry_delay),
        };

        let on_failure = match self.construction.on_failure {
            None | Some(FailurePolicyInput::Abort) => FailurePolicy::Abort,
            Some(FailurePolicyInput::Block) => FailurePolicy::Block {
                log_interval: Duration::from_millis(
                    self.construction
                        .block_log_interval_ms
                        .unwrap_or(10_000)
                        .max(1),
                ),
            },
        };

        if let (Some(settings), Some(properties)) = (&self.storage.settings_path, &self.storage.properties_path) {
            if settings == properties {
                return Err(ConfigError::Invalid(format!(
                    "storage.settings_path and storage.properties_path both point at {}",
                    settings.display()
                )));
            }
        }

        Ok(FactoryConfig {
            version,
            slot_count,
            driver,
            capability_slot,
            variant: self.variant.unwrap_or_default(),
            default_network_mode,
            lte_on_cdma: self.lte_on_cdma,
            lte_on_gsm: self.lte_on_gsm,
            guard,
            on_failure,
            storage: StorageConfig {
                settings_path: self.storage.settings_path,
                properties_path: self.storage.properties_path,
            },
        })
    }
}
