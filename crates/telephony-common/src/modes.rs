//! # Network Modes
//!
//! The preferred network mode table understood by radio interface drivers.
//! Numeric codes are part of the driver contract and are what the settings
//! store persists, so they must never be renumbered.
//!
//! | Code | Mode                              | Phone type |
//! |------|-----------------------------------|------------|
//! | 0    | WCDMA preferred                   | GSM        |
//! | 1    | GSM only                          | GSM        |
//! | 4    | CDMA (with EVDO)                  | CDMA       |
//! | 7    | Global (CDMA/EVDO/GSM/WCDMA)      | CDMA       |
//! | 9    | LTE/GSM/WCDMA                     | GSM        |
//! | 10   | LTE/CDMA/EVDO/GSM/WCDMA           | GSM        |
//! | ...  | TD-SCDMA combinations (13..=22)   | GSM        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    #[error("unknown network mode code {0}")]
    UnknownCode(i32),
    #[error("unknown network mode name {0:?}")]
    UnknownName(String),
    #[error("unknown cdma subscription source {0}")]
    UnknownSubscriptionSource(i32),
}

// ─── Operating mode ─────────────────────────────────────────────────────────

/// Negotiated network-technology preference for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum OperatingMode {
    WcdmaPref = 0,
    GsmOnly = 1,
    WcdmaOnly = 2,
    GsmUmts = 3,
    Cdma = 4,
    CdmaNoEvdo = 5,
    EvdoNoCdma = 6,
    Global = 7,
    LteCdmaEvdo = 8,
    LteGsmWcdma = 9,
    LteCdmaEvdoGsmWcdma = 10,
    LteOnly = 11,
    LteWcdma = 12,
    TdscdmaOnly = 13,
    TdscdmaWcdma = 14,
    LteTdscdma = 15,
    TdscdmaGsm = 16,
    LteTdscdmaGsm = 17,
    TdscdmaGsmWcdma = 18,
    LteTdscdmaWcdma = 19,
    LteTdscdmaGsmWcdma = 20,
    TdscdmaCdmaEvdoGsmWcdma = 21,
    LteTdscdmaCdmaEvdoGsmWcdma = 22,
}

/// Every mode in code order. `ALL[code]` is the mode for `code`.
const ALL: [OperatingMode; 23] = [
    OperatingMode::WcdmaPref,
    OperatingMode::GsmOnly,
    OperatingMode::WcdmaOnly,
    OperatingMode::GsmUmts,
    OperatingMode::Cdma,
    OperatingMode::CdmaNoEvdo,
    OperatingMode::EvdoNoCdma,
    OperatingMode::Global,
    OperatingMode::LteCdmaEvdo,
    OperatingMode::LteGsmWcdma,
    OperatingMode::LteCdmaEvdoGsmWcdma,
    OperatingMode::LteOnly,
    OperatingMode::LteWcdma,
    OperatingMode::TdscdmaOnly,
    OperatingMode::TdscdmaWcdma,
    OperatingMode::LteTdscdma,
    OperatingMode::TdscdmaGsm,
    OperatingMode::LteTdscdmaGsm,
    OperatingMode::TdscdmaGsmWcdma,
    OperatingMode::LteTdscdmaWcdma,
    OperatingMode::LteTdscdmaGsmWcdma,
    OperatingMode::TdscdmaCdmaEvdoGsmWcdma,
    OperatingMode::LteTdscdmaCdmaEvdoGsmWcdma,
];

impl OperatingMode {
    /// The restrictive mode forced onto every slot that is not the
    /// capability slot.
    pub const FALLBACK: OperatingMode = OperatingMode::GsmOnly;

    /// Default base preference when nothing is configured.
    pub const DEFAULT_PREFERRED: OperatingMode = OperatingMode::WcdmaPref;

    /// Numeric code as exchanged with drivers and persisted in settings.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, ModeError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| ALL.get(i).copied())
            .ok_or(ModeError::UnknownCode(code))
    }

    pub fn all() -> &'static [OperatingMode] {
        &ALL
    }

    /// Phone type a driver in this mode should present.
    ///
    /// `LteOnly` is ambiguous on its own: devices configured as LTE-on-CDMA
    /// treat it as CDMA, everything else as GSM.
    pub fn phone_type(self, lte_on_cdma: bool) -> PhoneType {
        match self {
            OperatingMode::Cdma
            | OperatingMode::CdmaNoEvdo
            | OperatingMode::EvdoNoCdma
            | OperatingMode::Global
            | OperatingMode::LteCdmaEvdo => PhoneType::Cdma,
            OperatingMode::LteOnly if lte_on_cdma => PhoneType::Cdma,
            _ => PhoneType::Gsm,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperatingMode::WcdmaPref => "wcdma_pref",
            OperatingMode::GsmOnly => "gsm_only",
            OperatingMode::WcdmaOnly => "wcdma_only",
            OperatingMode::GsmUmts => "gsm_umts",
            OperatingMode::Cdma => "cdma",
            OperatingMode::CdmaNoEvdo => "cdma_no_evdo",
            OperatingMode::EvdoNoCdma => "evdo_no_cdma",
            OperatingMode::Global => "global",
            OperatingMode::LteCdmaEvdo => "lte_cdma_evdo",
            OperatingMode::LteGsmWcdma => "lte_gsm_wcdma",
            OperatingMode::LteCdmaEvdoGsmWcdma => "lte_cdma_evdo_gsm_wcdma",
            OperatingMode::LteOnly => "lte_only",
            OperatingMode::LteWcdma => "lte_wcdma",
            OperatingMode::TdscdmaOnly => "tdscdma_only",
            OperatingMode::TdscdmaWcdma => "tdscdma_wcdma",
            OperatingMode::LteTdscdma => "lte_tdscdma",
            OperatingMode::TdscdmaGsm => "tdscdma_gsm",
            OperatingMode::LteTdscdmaGsm => "lte_tdscdma_gsm",
            OperatingMode::TdscdmaGsmWcdma => "tdscdma_gsm_wcdma",
            OperatingMode::LteTdscdmaWcdma => "lte_tdscdma_wcdma",
            OperatingMode::LteTdscdmaGsmWcdma => "lte_tdscdma_gsm_wcdma",
            OperatingMode::TdscdmaCdmaEvdoGsmWcdma => "tdscdma_cdma_evdo_gsm_wcdma",
            OperatingMode::LteTdscdmaCdmaEvdoGsmWcdma => "lte_tdscdma_cdma_evdo_gsm_wcdma",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

impl FromStr for OperatingMode {
    type Err = ModeError;

    /// Accepts either the snake_case name or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code);
        }
        ALL.iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModeError::UnknownName(s.to_string()))
    }
}

// ─── Phone type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneType {
    Gsm,
    Cdma,
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneType::Gsm => write!(f, "gsm"),
            PhoneType::Cdma => write!(f, "cdma"),
        }
    }
}

// ─── CDMA subscription source ───────────────────────────────────────────────

/// Where a CDMA-capable radio reads its subscription from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CdmaSubscriptionSource {
    RuimSim,
    #[default]
    Nv,
}

impl CdmaSubscriptionSource {
    pub fn code(self) -> i32 {
        match self {
            CdmaSubscriptionSource::RuimSim => 0,
            CdmaSubscriptionSource::Nv => 1,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, ModeError> {
        match code {
            0 => Ok(CdmaSubscriptionSource::RuimSim),
            1 => Ok(CdmaSubscriptionSource::Nv),
            other => Err(ModeError::UnknownSubscriptionSource(other)),
        }
    }
}

impl fmt::Display for CdmaSubscriptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdmaSubscriptionSource::RuimSim => write!(f, "ruim_sim"),
            CdmaSubscriptionSource::Nv => write!(f, "nv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table_position() {
        for (i, mode) in OperatingMode::all().iter().enumerate() {
            assert_eq!(mode.code(), i as i32);
            assert_eq!(OperatingMode::from_code(i as i32).unwrap(), *mode);
        }
        assert_eq!(OperatingMode::GsmOnly.code(), 1);
        assert_eq!(OperatingMode::Global.code(), 7);
        assert_eq!(OperatingMode::LteGsmWcdma.code(), 9);
    }

    #[test]
    fn unknown_codes_rejected() {
        assert_eq!(
            OperatingMode::from_code(-1),
            Err(ModeError::UnknownCode(-1))
        );
        assert_eq!(
            OperatingMode::from_code(23),
            Err(ModeError::UnknownCode(23))
        );
    }

    #[test]
    fn parse_by_name_or_code() {
        assert_eq!(
            "lte_gsm_wcdma".parse::<OperatingMode>().unwrap(),
            OperatingMode::LteGsmWcdma
        );
        assert_eq!(
            "GSM_ONLY".parse::<OperatingMode>().unwrap(),
            OperatingMode::GsmOnly
        );
        assert_eq!("7".parse::<OperatingMode>().unwrap(), OperatingMode::Global);
        assert!("warp_drive".parse::<OperatingMode>().is_err());
    }

    #[test]
    fn phone_type_derivation() {
        assert_eq!(OperatingMode::GsmOnly.phone_type(false), PhoneType::Gsm);
        assert_eq!(OperatingMode::Global.phone_type(false), PhoneType::Cdma);
        assert_eq!(OperatingMode::LteCdmaEvdo.phone_type(false), PhoneType::Cdma);
        assert_eq!(OperatingMode::LteOnly.phone_type(false), PhoneType::Gsm);
        assert_eq!(OperatingMode::LteOnly.phone_type(true), PhoneType::Cdma);
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(format!("{}", OperatingMode::GsmOnly), "gsm_only (1)");
    }

    #[test]
    fn subscription_source_codes() {
        assert_eq!(CdmaSubscriptionSource::default(), CdmaSubscriptionSource::Nv);
        assert_eq!(
            CdmaSubscriptionSource::from_code(0).unwrap(),
            CdmaSubscriptionSource::RuimSim
        );
        assert!(CdmaSubscriptionSource::from_code(5).is_err());
    }
}
