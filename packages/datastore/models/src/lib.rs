#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Datastore row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the datastore. They are distinct from the API response types in
//! `platewatch_server_models`, which render plates in their Devanagari
//! display form.

use chrono::{DateTime, Utc};
use platewatch_predict::Waypoint;
use platewatch_vehicle_models::{FlagCategory, ReportStatus, VehicleStatus};
use serde::{Deserialize, Serialize};

/// A tracked vehicle row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Primary key.
    pub id: i64,
    /// Unique plate text, stored as entered.
    pub plate_number: String,
    /// Authoritative tracking status driving the alerting pipeline.
    pub status: VehicleStatus,
    /// Registered owner, free text.
    pub owner: String,
    /// Timestamp of the most recent linked sighting.
    pub last_seen: Option<DateTime<Utc>>,
    /// Operator notes.
    pub notes: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single camera observation of a plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Primary key.
    pub id: i64,
    /// Plate text exactly as observed.
    pub plate_number: String,
    /// Weak reference to the resolved vehicle, set by the reactor.
    pub vehicle_id: Option<i64>,
    /// Body type reported by the camera (sedan, suv, ...).
    pub vehicle_type: String,
    /// Colour reported by the camera.
    pub color: String,
    /// Latitude in WGS84.
    pub latitude: f64,
    /// Longitude in WGS84.
    pub longitude: f64,
    /// Speed in km/h.
    pub speed_kmh: f64,
    /// Heading in degrees, 0 is north.
    pub heading_deg: f64,
    /// When the observation happened.
    pub timestamp: DateTime<Utc>,
}

/// An alert raised when a flagged vehicle is sighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Primary key.
    pub id: i64,
    /// Normalized plate of the sighted vehicle.
    pub plate_number: String,
    /// Weak reference to the vehicle that triggered the alert.
    pub vehicle_id: Option<i64>,
    /// Vehicle status at trigger time.
    pub status: VehicleStatus,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
    /// First predicted waypoint latitude.
    pub predicted_latitude: Option<f64>,
    /// First predicted waypoint longitude.
    pub predicted_longitude: Option<f64>,
    /// Human-readable alert text.
    pub message: String,
    /// Whether an operator has acknowledged the alert.
    pub acknowledged: bool,
    /// Whether a unit has been dispatched.
    pub dispatched: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// A write-once route snapshot produced by the reactor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedRoute {
    /// Primary key.
    pub id: i64,
    /// Normalized plate the route belongs to.
    pub plate_number: String,
    /// Ordered predicted waypoints.
    pub path: Vec<Waypoint>,
    /// When the snapshot was generated.
    pub generated_at: DateTime<Utc>,
}

/// Authoritative police registration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliceVehicleRegistration {
    /// Primary key.
    pub id: i64,
    /// Unique registry identifier.
    pub registration_id: String,
    /// Registered plate text.
    pub plate_number: String,
    /// Vehicle make.
    pub make: String,
    /// Vehicle model.
    pub model: String,
    /// Registered owner name.
    pub owner_name: String,
    /// Issuing region code.
    pub region_code: String,
    /// When the registration was issued.
    pub registered_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A police report for a stolen vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StolenVehicleReport {
    /// Primary key.
    pub id: i64,
    /// Unique case number.
    pub case_number: String,
    /// Plate text on the report.
    pub plate_number: String,
    /// Weak reference to the matching registration.
    pub registration_id: Option<i64>,
    /// When the theft was reported.
    pub report_timestamp: DateTime<Utc>,
    /// Whether the case is still open.
    pub status: ReportStatus,
    /// Region the report was filed in.
    pub region_code: String,
    /// Free-text case details.
    pub details: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// An owner flagged for extra scrutiny.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerWatchlist {
    /// Primary key.
    pub id: i64,
    /// Watched owner name.
    pub owner_name: String,
    /// Why the owner was flagged.
    pub reason: String,
    /// When the owner was flagged.
    pub flagged_at: DateTime<Utc>,
    /// Whether the entry still participates in verification.
    pub active: bool,
}

/// Append-only audit record of a verification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// Primary key.
    pub id: i64,
    /// Request payload exactly as received.
    pub input_payload: serde_json::Value,
    /// Registration that matched, if any.
    pub matched_registration_id: Option<i64>,
    /// Most recent stolen report that matched, if any.
    pub matched_stolen_report_id: Option<i64>,
    /// Watchlist entry that matched, if any.
    pub matched_owner_watchlist_id: Option<i64>,
    /// Whether a registration matched the request plate.
    pub match_status: bool,
    /// Classification assigned by the engine.
    pub flag_category: FlagCategory,
    /// Confidence score, 0-100 with one decimal.
    pub confidence: f64,
    /// When the verification ran.
    pub verification_timestamp: DateTime<Utc>,
    /// Wall-clock duration of the verification call.
    pub response_time_ms: u64,
    /// Case numbers of every open stolen report that matched.
    pub reference_case_numbers: Vec<String>,
    /// Outcome note, e.g. the regional check result.
    pub message: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// Insert form of [`Vehicle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub plate_number: String,
    pub status: VehicleStatus,
    pub owner: String,
    pub notes: String,
}

/// Insert form of [`Sighting`]. A missing timestamp means "now".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSighting {
    pub plate_number: String,
    pub vehicle_id: Option<i64>,
    pub vehicle_type: String,
    pub color: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_deg: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Insert form of [`Alert`]. Alerts start unacknowledged and
/// undispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub plate_number: String,
    pub vehicle_id: Option<i64>,
    pub status: VehicleStatus,
    pub timestamp: DateTime<Utc>,
    pub predicted_latitude: Option<f64>,
    pub predicted_longitude: Option<f64>,
    pub message: String,
}

/// Insert form of [`PredictedRoute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPredictedRoute {
    pub plate_number: String,
    pub path: Vec<Waypoint>,
    pub generated_at: DateTime<Utc>,
}

/// Insert form of [`PoliceVehicleRegistration`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub registration_id: String,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub owner_name: String,
    pub region_code: String,
    pub registered_at: Option<DateTime<Utc>>,
}

/// Insert form of [`StolenVehicleReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStolenReport {
    pub case_number: String,
    pub plate_number: String,
    pub registration_id: Option<i64>,
    pub report_timestamp: DateTime<Utc>,
    pub status: ReportStatus,
    pub region_code: String,
    pub details: String,
}

/// Insert form of [`OwnerWatchlist`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWatchlistEntry {
    pub owner_name: String,
    pub reason: String,
    pub flagged_at: DateTime<Utc>,
    pub active: bool,
}

/// Insert form of [`VerificationAttempt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVerificationAttempt {
    pub input_payload: serde_json::Value,
    pub matched_registration_id: Option<i64>,
    pub matched_stolen_report_id: Option<i64>,
    pub matched_owner_watchlist_id: Option<i64>,
    pub match_status: bool,
    pub flag_category: FlagCategory,
    pub confidence: f64,
    pub verification_timestamp: DateTime<Utc>,
    pub response_time_ms: u64,
    pub reference_case_numbers: Vec<String>,
    pub message: String,
}

/// Partial update of a [`Vehicle`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleUpdate {
    pub status: Option<VehicleStatus>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Time-window query for recent sightings and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentQuery {
    /// Inclusive lower bound on the row timestamp.
    pub since: DateTime<Utc>,
    /// Maximum number of rows to return, newest first.
    pub limit: usize,
}

impl RecentQuery {
    #[must_use]
    pub const fn new(since: DateTime<Utc>, limit: usize) -> Self {
        Self { since, limit }
    }
}
