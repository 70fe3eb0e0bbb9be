#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the platewatch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the datastore row types to allow independent evolution of the API
//! contract; the main difference is that plate numbers are rendered in
//! their Devanagari display form on the way out.

use chrono::{DateTime, Utc};
use platewatch_datastore_models::{Alert, PredictedRoute, Sighting, Vehicle};
use platewatch_plates::convert_plate_to_devanagari;
use platewatch_predict::Waypoint;
use platewatch_vehicle_models::VehicleStatus;
use serde::{Deserialize, Serialize};

/// A tracked vehicle as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVehicle {
    /// Unique vehicle ID.
    pub id: i64,
    /// Plate number in Devanagari display form.
    pub plate_number: String,
    /// Tracking status.
    pub status: VehicleStatus,
    /// Registered owner.
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

impl From<Vehicle> for ApiVehicle {
    fn from(row: Vehicle) -> Self {
        Self {
            id: row.id,
            plate_number: convert_plate_to_devanagari(&row.plate_number),
            status: row.status,
            owner: row.owner,
            last_seen: row.last_seen,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A camera sighting as returned by the API, with the resolved vehicle
/// nested for map display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSighting {
    /// Unique sighting ID.
    pub id: i64,
    /// Plate number in Devanagari display form.
    pub plate_number: String,
    /// Resolved vehicle, if the reactor linked one.
    pub vehicle: Option<ApiVehicle>,
    /// Body type reported by the camera.
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

impl ApiSighting {
    /// Builds the response shape from a sighting row and its resolved
    /// vehicle.
    #[must_use]
    pub fn with_vehicle(row: Sighting, vehicle: Option<Vehicle>) -> Self {
        Self {
            id: row.id,
            plate_number: convert_plate_to_devanagari(&row.plate_number),
            vehicle: vehicle.map(ApiVehicle::from),
            vehicle_type: row.vehicle_type,
            color: row.color,
            latitude: row.latitude,
            longitude: row.longitude,
            speed_kmh: row.speed_kmh,
            heading_deg: row.heading_deg,
            timestamp: row.timestamp,
        }
    }
}

/// An alert as returned by the API. The vehicle is referenced by ID
/// only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAlert {
    /// Unique alert ID.
    pub id: i64,
    /// Plate number in Devanagari display form.
    pub plate_number: String,
    /// ID of the vehicle that triggered the alert.
    pub vehicle: Option<i64>,
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

impl From<Alert> for ApiAlert {
    fn from(row: Alert) -> Self {
        Self {
            id: row.id,
            plate_number: convert_plate_to_devanagari(&row.plate_number),
            vehicle: row.vehicle_id,
            status: row.status,
            timestamp: row.timestamp,
            predicted_latitude: row.predicted_latitude,
            predicted_longitude: row.predicted_longitude,
            message: row.message,
            acknowledged: row.acknowledged,
            dispatched: row.dispatched,
            created_at: row.created_at,
        }
    }
}

/// A predicted route as returned by the API. The placeholder returned
/// for a vehicle with no stored route carries only the plate and an
/// empty path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRoute {
    /// Unique route ID, absent for the placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Plate number the route belongs to.
    pub plate_number: String,
    /// Ordered predicted waypoints.
    pub path: Vec<Waypoint>,
    /// When the snapshot was generated, absent for the placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl ApiRoute {
    /// Placeholder for a vehicle with no stored route. The plate is
    /// passed through as stored, not converted.
    #[must_use]
    pub fn empty(plate_number: &str) -> Self {
        Self {
            id: None,
            plate_number: plate_number.to_string(),
            path: vec![],
            generated_at: None,
        }
    }
}

impl From<PredictedRoute> for ApiRoute {
    fn from(row: PredictedRoute) -> Self {
        Self {
            id: Some(row.id),
            plate_number: convert_plate_to_devanagari(&row.plate_number),
            path: row.path,
            generated_at: Some(row.generated_at),
        }
    }
}

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStats {
    /// Sightings recorded in the last 24 hours.
    pub vehicles_scanned_24h: usize,
    /// Alerts raised in the last 24 hours.
    pub alerts_triggered_24h: usize,
    /// Distinct plates sighted in the last 5 minutes.
    pub total_vehicles_online: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Unified dataset payload: vehicles, recent sightings, and recent
/// alerts in one response.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetResponse {
    /// Every tracked vehicle, ordered by plate.
    pub vehicles: Vec<ApiVehicle>,
    /// Recent sightings, newest first.
    pub sightings: Vec<ApiSighting>,
    /// Recent alerts, newest first.
    pub alerts: Vec<ApiAlert>,
    /// Where the payload came from; always `"api"`.
    pub source: String,
}

/// Query parameters for the recent sightings and alerts endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentParams {
    /// Window size in minutes.
    pub minutes: Option<i64>,
}

/// Query parameters for the unified dataset endpoint. These predate the
/// snake_case convention used everywhere else.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetParams {
    /// Sighting window in minutes.
    pub minutes_sightings: Option<i64>,
    /// Alert window in minutes.
    pub minutes_alerts: Option<i64>,
    /// Maximum number of sightings.
    pub limit_sightings: Option<usize>,
    /// Maximum number of alerts.
    pub limit_alerts: Option<usize>,
}

/// Query parameters for the vehicle listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleListParams {
    /// Status name to filter by; an unknown name matches nothing.
    pub status: Option<String>,
}

/// Body of `POST /api/sightings`.
#[derive(Debug, Clone, Deserialize)]
pub struct SightingBody {
    /// Observed plate text.
    pub plate_number: String,
    /// Pre-resolved vehicle reference.
    pub vehicle_id: Option<i64>,
    /// Body type reported by the camera.
    pub vehicle_type: Option<String>,
    /// Colour reported by the camera.
    pub color: Option<String>,
    /// Latitude in WGS84.
    pub latitude: f64,
    /// Longitude in WGS84.
    pub longitude: f64,
    /// Speed in km/h.
    pub speed_kmh: Option<f64>,
    /// Heading in degrees.
    pub heading_deg: Option<f64>,
    /// Observation time; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of `POST /api/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyBody {
    /// Plate to verify.
    pub plate_number: String,
    /// Claimed vehicle make.
    pub make: Option<String>,
    /// Claimed vehicle model.
    pub model: Option<String>,
    /// Claimed owner name.
    pub owner_name: Option<String>,
    /// Issuing region code.
    pub region_code: Option<String>,
    /// Observation time.
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_row() -> Vehicle {
        Vehicle {
            id: 4,
            plate_number: "BA 12 PA 1234".to_string(),
            status: VehicleStatus::Suspicious,
            owner: "राम बहादुर श्रेष्ठ".to_string(),
            last_seen: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn vehicle_plate_is_rendered_in_devanagari() {
        let api = ApiVehicle::from(vehicle_row());
        assert_eq!(api.plate_number, "BA १२ PA १२३४");
        assert_eq!(api.status, VehicleStatus::Suspicious);
    }

    #[test]
    fn sighting_nests_the_resolved_vehicle() {
        let row = Sighting {
            id: 9,
            plate_number: "बा १२ प १२३४".to_string(),
            vehicle_id: Some(4),
            vehicle_type: "sedan".to_string(),
            color: "white".to_string(),
            latitude: 27.7,
            longitude: 85.3,
            speed_kmh: 42.0,
            heading_deg: 180.0,
            timestamp: Utc::now(),
        };

        let api = ApiSighting::with_vehicle(row.clone(), Some(vehicle_row()));
        assert_eq!(api.vehicle.as_ref().map(|v| v.id), Some(4));

        let api = ApiSighting::with_vehicle(row, None);
        assert!(api.vehicle.is_none());
    }

    #[test]
    fn alert_references_the_vehicle_by_id() {
        let row = Alert {
            id: 2,
            plate_number: "बा १२ प १२३४".to_string(),
            vehicle_id: Some(4),
            status: VehicleStatus::Stolen,
            timestamp: Utc::now(),
            predicted_latitude: Some(27.7),
            predicted_longitude: Some(85.3),
            message: "Match on STOLEN vehicle बा १२ प १२३४".to_string(),
            acknowledged: false,
            dispatched: false,
            created_at: Utc::now(),
        };

        let api = ApiAlert::from(row);
        assert_eq!(api.vehicle, Some(4));
        assert!(!api.acknowledged);
    }

    #[test]
    fn placeholder_route_omits_id_and_generated_at() {
        let value = serde_json::to_value(ApiRoute::empty("बा १२ प १२३४")).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("generated_at").is_none());
        assert_eq!(
            value.get("path").and_then(serde_json::Value::as_array).map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn stored_route_keeps_id_and_generated_at() {
        let row = PredictedRoute {
            id: 7,
            plate_number: "बा १२ प १२३४".to_string(),
            path: vec![],
            generated_at: Utc::now(),
        };
        let value = serde_json::to_value(ApiRoute::from(row)).unwrap();
        assert_eq!(value.get("id").and_then(serde_json::Value::as_i64), Some(7));
        assert!(value.get("generated_at").is_some());
    }

    #[test]
    fn dataset_params_are_camel_case() {
        let params: DatasetParams = serde_json::from_value(serde_json::json!({
            "minutesSightings": 30,
            "limitAlerts": 10
        }))
        .unwrap();
        assert_eq!(params.minutes_sightings, Some(30));
        assert_eq!(params.minutes_alerts, None);
        assert_eq!(params.limit_alerts, Some(10));
    }
}
