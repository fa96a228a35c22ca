//! Global settings and durable property stores.
//!
//! Absence is a normal outcome: getters return `None` and the caller picks a
//! default. Values that exist but do not parse are treated the same way.
//! Only writes can fail, and only for durable backends.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use telephony_common::SubscriptionId;
use tracing::debug;

use crate::error::SettingsError;

/// Setting and property key names.
pub mod keys {
    use super::SubscriptionId;

    pub const PREFERRED_NETWORK_MODE: &str = "preferred_network_mode";
    pub const CDMA_SUBSCRIPTION_MODE: &str = "subscription_mode";
    pub const VOICE_SUBSCRIPTION: &str = "multi_sim_voice_call";
    pub const VOICE_PROMPT: &str = "multi_sim_voice_prompt";
    pub const SMS_SUBSCRIPTION: &str = "multi_sim_sms";
    pub const SMS_PROMPT: &str = "multi_sim_sms_prompt";
    pub const DATA_SUBSCRIPTION: &str = "multi_sim_data_call";

    /// Durable property recording the last default subscription.
    pub const DEFAULT_SUBSCRIPTION: &str = "persist.radio.default.sub";
    /// Durable property recording the last default slot.
    pub const DEFAULT_SLOT: &str = "persist.radio.default.slot";

    pub fn preferred_mode_for_slot(slot: usize) -> String {
        format!("{PREFERRED_NETWORK_MODE}.slot{slot}")
    }

    pub fn preferred_mode_for_subscription(sub: SubscriptionId) -> String {
        format!("{PREFERRED_NETWORK_MODE}.sub{}", sub.0)
    }
}

/// Key/value store shared with the rest of the system.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Every entry, sorted by key.
    fn snapshot(&self) -> BTreeMap<String, String>;

    fn get_int(&self, key: &str) -> Option<i32> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(key, value = %raw, "ignoring non-integer setting");
                None
            }
        }
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.put(key, &value.to_string())
    }
}

// ── In-memory ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding for tests and simulated setups.
    pub fn with(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.to_string());
        self
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ── JSON file ───────────────────────────────────────────────────────

/// Store persisted as one JSON object. Every `put` rewrites the file through
/// a temporary sibling and a rename, so readers never see a torn file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Load `path`, or start empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                SettingsError::Encoding {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_vec_pretty(values).map_err(|source| SettingsError::Encoding {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&values) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
