//! Shared types for the telephony stack.
//!
//! This crate contains:
//! - **Network modes**: the radio interface numeric mode table and phone type derivation
//! - **Identifiers**: subscription ids and slot selectors
//! - **Events**: the default-subscription change notification

pub mod events;
pub mod ids;
pub mod modes;

pub use events::DefaultSubscriptionChanged;
pub use ids::{SlotSelector, SubscriptionId};
pub use modes::{CdmaSubscriptionSource, ModeError, OperatingMode, PhoneType};
