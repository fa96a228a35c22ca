//! Process-wide notifications emitted by the telephony core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SubscriptionId;

/// The default slot changed. Carries the new slot and the subscription
/// currently bound to it, if the directory knows one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSubscriptionChanged {
    pub slot: usize,
    pub subscription: Option<SubscriptionId>,
    pub ts: DateTime<Utc>,
}

impl DefaultSubscriptionChanged {
    pub fn new(slot: usize, subscription: Option<SubscriptionId>) -> Self {
        Self {
            slot,
            subscription,
            ts: Utc::now(),
        }
    }

    /// JSON form for external listeners that are not linked against this crate.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let ev = DefaultSubscriptionChanged::new(1, Some(SubscriptionId(7)));
        let v: serde_json::Value = serde_json::from_str(&ev.to_json().unwrap()).unwrap();
        assert_eq!(v["slot"], 1);
        assert_eq!(v["subscription"], 7);
        assert!(v["ts"].is_string());
    }

    #[test]
    fn json_without_subscription() {
        let ev = DefaultSubscriptionChanged::new(0, None);
        let back: DefaultSubscriptionChanged =
            serde_json::from_str(&ev.to_json().unwrap()).unwrap();
        assert_eq!(back, ev);
    }
}
