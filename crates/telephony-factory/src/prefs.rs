//! Multi-SIM voice/SMS/data preferences backed by the settings store.

use std::sync::Arc;

use telephony_common::SubscriptionId;

use crate::error::SettingsError;
use crate::settings::{SettingsStore, keys};

#[derive(Clone)]
pub struct MultiSimPrefs {
    settings: Arc<dyn SettingsStore>,
}

impl MultiSimPrefs {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// [`SubscriptionId::INVALID`] when unset.
    pub fn voice_subscription(&self) -> SubscriptionId {
        self.subscription(keys::VOICE_SUBSCRIPTION)
    }

    pub fn sms_subscription(&self) -> SubscriptionId {
        self.subscription(keys::SMS_SUBSCRIPTION)
    }

    pub fn data_subscription(&self) -> SubscriptionId {
        self.subscription(keys::DATA_SUBSCRIPTION)
    }

    pub fn is_voice_prompt_enabled(&self) -> bool {
        self.flag(keys::VOICE_PROMPT)
    }

    pub fn set_voice_prompt_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.put_int(keys::VOICE_PROMPT, i32::from(enabled))
    }

    pub fn is_sms_prompt_enabled(&self) -> bool {
        self.flag(keys::SMS_PROMPT)
    }

    pub fn set_sms_prompt_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.put_int(keys::SMS_PROMPT, i32::from(enabled))
    }

    fn subscription(&self, key: &str) -> SubscriptionId {
        self.settings
            .get_int(key)
            .map(SubscriptionId)
            .unwrap_or(SubscriptionId::INVALID)
    }

    fn flag(&self, key: &str) -> bool {
        self.settings.get_int(key).is_some_and(|v| v != 0)
    }
}
