#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Vehicle status and verification flag taxonomy types.
//!
//! This crate defines the shared three-state vocabulary used across the
//! pipeline: vehicle tracking status, verification flag categories, and
//! stolen report lifecycle states. Every component that classifies a
//! vehicle speaks these enums.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Tracking status carried by every vehicle row.
///
/// `Suspicious` and `Stolen` are the flagged states: a sighting of a
/// vehicle in either state raises an alert and a predicted route.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Normal,
    Suspicious,
    Stolen,
}

impl VehicleStatus {
    /// Whether a sighting of a vehicle in this status should trigger the
    /// alerting pipeline.
    #[must_use]
    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Suspicious | Self::Stolen)
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Normal, Self::Suspicious, Self::Stolen]
    }
}

/// Outcome category assigned by the verification engine.
///
/// Shares its wire form with [`VehicleStatus`] so alert rows and
/// verification attempts serialize the same vocabulary.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlagCategory {
    #[default]
    Normal,
    Suspicious,
    Stolen,
}

impl FlagCategory {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Normal, Self::Suspicious, Self::Stolen]
    }
}

impl From<VehicleStatus> for FlagCategory {
    fn from(status: VehicleStatus) -> Self {
        match status {
            VehicleStatus::Normal => Self::Normal,
            VehicleStatus::Suspicious => Self::Suspicious,
            VehicleStatus::Stolen => Self::Stolen,
        }
    }
}

/// Lifecycle of a stolen vehicle report. Only `Open` reports participate
/// in verification scoring.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Resolved,
}

impl ReportStatus {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_status_round_trips_through_strings() {
        for status in VehicleStatus::all() {
            let parsed: VehicleStatus = status
                .to_string()
                .parse()
                .unwrap_or_else(|e| panic!("failed to parse {status}: {e:?}"));
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn vehicle_status_uses_lowercase_wire_form() {
        assert_eq!(VehicleStatus::Stolen.to_string(), "stolen");
        assert_eq!(
            "suspicious".parse::<VehicleStatus>().unwrap(),
            VehicleStatus::Suspicious
        );
        assert!("STOLEN!".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn only_suspicious_and_stolen_are_flagged() {
        assert!(!VehicleStatus::Normal.is_flagged());
        assert!(VehicleStatus::Suspicious.is_flagged());
        assert!(VehicleStatus::Stolen.is_flagged());
    }

    #[test]
    fn flag_category_mirrors_vehicle_status() {
        assert_eq!(
            FlagCategory::from(VehicleStatus::Stolen),
            FlagCategory::Stolen
        );
        assert_eq!(
            FlagCategory::from(VehicleStatus::Normal),
            FlagCategory::Normal
        );
    }

    #[test]
    fn report_status_defaults_to_open() {
        assert_eq!(ReportStatus::default(), ReportStatus::Open);
        assert!(ReportStatus::Open.is_open());
        assert!(!ReportStatus::Resolved.is_open());
    }
}
