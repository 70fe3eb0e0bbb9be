#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Sighting ingestion and the reactive alerting pipeline.
//!
//! [`record_sighting`] validates an incoming camera observation, persists
//! it, and runs the reactor inside the same storage unit: the vehicle is
//! re-resolved, its last-seen stamp refreshed, and a flagged status
//! produces an alert plus a short-horizon route snapshot. The whole unit
//! commits together or not at all.

use chrono::Utc;
use platewatch_datastore::{Datastore, SightingTxn, StoreError};
use platewatch_datastore_models::{
    Alert, NewAlert, NewPredictedRoute, NewSighting, PredictedRoute, Sighting,
};
use platewatch_plates::normalize_plate;
use platewatch_predict::predict_route;

/// Number of waypoints in a reactor route snapshot.
pub const ROUTE_STEPS: u32 = 10;

/// Seconds between consecutive route waypoints.
pub const ROUTE_STEP_SECONDS: u32 = 30;

/// Errors that can occur while recording a sighting.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A field was rejected before anything was written.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The storage unit failed or rolled back.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Side effects the reactor produced for one sighting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactorOutcome {
    /// Vehicle the sighting resolved to, if any.
    pub vehicle_id: Option<i64>,
    /// Alert raised for a flagged vehicle.
    pub alert: Option<Alert>,
    /// Route snapshot generated alongside the alert.
    pub route: Option<PredictedRoute>,
}

/// A stored sighting together with its reactor side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSighting {
    /// The persisted sighting row.
    pub sighting: Sighting,
    /// What the reactor did.
    pub outcome: ReactorOutcome,
}

fn validate(sighting: &NewSighting) -> Result<(), IngestError> {
    if sighting.plate_number.trim().is_empty() {
        return Err(IngestError::Validation {
            field: "plate_number",
            message: "must not be blank".to_string(),
        });
    }
    if !(-90.0..=90.0).contains(&sighting.latitude) {
        return Err(IngestError::Validation {
            field: "latitude",
            message: format!("{} is outside [-90, 90]", sighting.latitude),
        });
    }
    if !(-180.0..=180.0).contains(&sighting.longitude) {
        return Err(IngestError::Validation {
            field: "longitude",
            message: format!("{} is outside [-180, 180]", sighting.longitude),
        });
    }
    Ok(())
}

/// Reactor body, run while the sighting write is still open.
fn on_sighting_created(
    txn: &mut dyn SightingTxn,
    sighting: &Sighting,
    outcome: &mut ReactorOutcome,
) -> Result<(), StoreError> {
    // Dash variants only; spacing is load-bearing for exact plate lookups.
    let plate = normalize_plate(&sighting.plate_number);

    let vehicle = match sighting.vehicle_id {
        Some(id) => txn.vehicle_by_id(id)?,
        None => None,
    };
    let vehicle = match vehicle {
        Some(vehicle) => Some(vehicle),
        None => txn.vehicle_by_plate(&plate)?,
    };
    let Some(vehicle) = vehicle else {
        return Ok(());
    };

    if sighting.vehicle_id != Some(vehicle.id) {
        txn.link_vehicle(sighting.id, vehicle.id)?;
    }
    txn.touch_last_seen(vehicle.id, sighting.timestamp)?;
    outcome.vehicle_id = Some(vehicle.id);

    if !vehicle.status.is_flagged() {
        return Ok(());
    }

    let path = predict_route(
        sighting.latitude,
        sighting.longitude,
        sighting.heading_deg,
        sighting.speed_kmh,
        ROUTE_STEPS,
        ROUTE_STEP_SECONDS,
    );
    let (predicted_latitude, predicted_longitude) = path
        .first()
        .map_or((sighting.latitude, sighting.longitude), |waypoint| {
            (waypoint.lat, waypoint.lon)
        });

    let now = Utc::now();
    let route = txn.insert_route(NewPredictedRoute {
        plate_number: plate.clone(),
        path,
        generated_at: now,
    })?;
    let alert = txn.insert_alert(NewAlert {
        plate_number: plate.clone(),
        vehicle_id: Some(vehicle.id),
        status: vehicle.status,
        timestamp: now,
        predicted_latitude: Some(predicted_latitude),
        predicted_longitude: Some(predicted_longitude),
        message: format!(
            "Match on {} vehicle {plate}",
            vehicle.status.as_ref().to_uppercase()
        ),
    })?;
    log::info!(
        "Alert {} raised for {} vehicle {plate}",
        alert.id,
        vehicle.status
    );

    outcome.route = Some(route);
    outcome.alert = Some(alert);
    Ok(())
}

/// Validates and persists one sighting, running the alerting reactor in
/// the same storage unit.
///
/// # Errors
///
/// Returns [`IngestError::Validation`] when a field is rejected, or
/// [`IngestError::Store`] when the storage unit fails. A reactor failure
/// rolls the sighting back too.
pub fn record_sighting(
    store: &dyn Datastore,
    sighting: NewSighting,
) -> Result<RecordedSighting, IngestError> {
    validate(&sighting)?;

    let mut outcome = ReactorOutcome::default();
    let mut hook = |txn: &mut dyn SightingTxn, stored: &Sighting| {
        on_sighting_created(txn, stored, &mut outcome)
    };
    let sighting = store.create_sighting(sighting, &mut hook)?;

    Ok(RecordedSighting { sighting, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use platewatch_datastore::memory::MemoryDatastore;
    use platewatch_datastore_models::NewVehicle;
    use platewatch_vehicle_models::VehicleStatus;

    fn sighting(plate: &str) -> NewSighting {
        NewSighting {
            plate_number: plate.to_string(),
            vehicle_type: "sedan".to_string(),
            color: "white".to_string(),
            latitude: 27.7172,
            longitude: 85.3240,
            speed_kmh: 40.0,
            heading_deg: 90.0,
            ..NewSighting::default()
        }
    }

    fn vehicle(plate: &str, status: VehicleStatus) -> NewVehicle {
        NewVehicle {
            plate_number: plate.to_string(),
            status,
            owner: "Ram Bahadur".to_string(),
            notes: String::new(),
        }
    }

    fn query(since: chrono::DateTime<Utc>) -> platewatch_datastore_models::RecentQuery {
        platewatch_datastore_models::RecentQuery::new(since, 100)
    }

    #[test]
    fn unknown_plate_stores_sighting_without_side_effects() {
        let store = MemoryDatastore::new();
        let recorded = record_sighting(&store, sighting("बा १२ प १२३४")).unwrap();

        assert_eq!(recorded.sighting.vehicle_id, None);
        assert_eq!(recorded.outcome, ReactorOutcome::default());

        let since = Utc::now() - Duration::minutes(10);
        assert!(store.recent_alerts(&query(since)).unwrap().is_empty());
        assert_eq!(store.recent_sightings(&query(since)).unwrap().len(), 1);
    }

    #[test]
    fn normal_vehicle_updates_last_seen_only() {
        let store = MemoryDatastore::new();
        let stored = store
            .insert_vehicle(vehicle("बा १२ प १२३४", VehicleStatus::Normal))
            .unwrap();

        let seen_at = Utc::now() - Duration::minutes(5);
        let mut input = sighting("बा १२ प १२३४");
        input.timestamp = Some(seen_at);
        let recorded = record_sighting(&store, input).unwrap();

        assert_eq!(recorded.sighting.vehicle_id, Some(stored.id));
        assert_eq!(recorded.outcome.vehicle_id, Some(stored.id));
        assert!(recorded.outcome.alert.is_none());
        assert!(recorded.outcome.route.is_none());

        let refreshed = store.vehicle_by_id(stored.id).unwrap().unwrap();
        assert_eq!(refreshed.last_seen, Some(seen_at));
    }

    #[test]
    fn flagged_vehicle_raises_alert_and_route() {
        let store = MemoryDatastore::new();
        let stored = store
            .insert_vehicle(vehicle("बा १२ प १२३४", VehicleStatus::Stolen))
            .unwrap();

        let recorded = record_sighting(&store, sighting("बा १२ प १२३४")).unwrap();
        let alert = recorded.outcome.alert.unwrap();
        let route = recorded.outcome.route.unwrap();

        assert_eq!(alert.vehicle_id, Some(stored.id));
        assert_eq!(alert.status, VehicleStatus::Stolen);
        assert_eq!(alert.message, "Match on STOLEN vehicle बा १२ प १२३४");
        assert!(!alert.acknowledged);

        #[allow(clippy::cast_possible_truncation)]
        let steps = ROUTE_STEPS as usize;
        assert_eq!(route.path.len(), steps);
        assert_eq!(route.plate_number, "बा १२ प १२३४");

        // The alert points at the first predicted waypoint.
        let expected = predict_route(
            27.7172,
            85.3240,
            90.0,
            40.0,
            ROUTE_STEPS,
            ROUTE_STEP_SECONDS,
        );
        assert!((alert.predicted_latitude.unwrap() - expected[0].lat).abs() < 1e-9);
        assert!((alert.predicted_longitude.unwrap() - expected[0].lon).abs() < 1e-9);

        let latest = store.latest_route_for_plate("बा १२ प १२३४").unwrap();
        assert_eq!(latest.map(|r| r.id), Some(route.id));
    }

    #[test]
    fn dash_variants_resolve_existing_vehicle() {
        let store = MemoryDatastore::new();
        let stored = store
            .insert_vehicle(vehicle(
                "प्रदेश ३-०१-१२ च १२३४",
                VehicleStatus::Suspicious,
            ))
            .unwrap();

        // Em and en dashes in the feed collapse to plain hyphens.
        let recorded = record_sighting(&store, sighting("प्रदेश ३—०१–१२ च १२३४")).unwrap();
        let alert = recorded.outcome.alert.unwrap();

        assert_eq!(recorded.sighting.vehicle_id, Some(stored.id));
        assert_eq!(alert.plate_number, "प्रदेश ३-०१-१२ च १२३४");
        assert_eq!(
            alert.message,
            "Match on SUSPICIOUS vehicle प्रदेश ३-०१-१२ च १२३४"
        );
    }

    #[test]
    fn preset_vehicle_reference_wins_over_plate_lookup() {
        let store = MemoryDatastore::new();
        let first = store
            .insert_vehicle(vehicle("बा १ प ०००१", VehicleStatus::Normal))
            .unwrap();
        store
            .insert_vehicle(vehicle("बा २ प ०००२", VehicleStatus::Stolen))
            .unwrap();

        let mut input = sighting("बा २ प ०००२");
        input.vehicle_id = Some(first.id);
        let recorded = record_sighting(&store, input).unwrap();

        assert_eq!(recorded.outcome.vehicle_id, Some(first.id));
        assert!(recorded.outcome.alert.is_none());
    }

    #[test]
    fn plate_resolution_ignores_case() {
        let store = MemoryDatastore::new();
        let stored = store
            .insert_vehicle(vehicle("BA 12 PA 1234", VehicleStatus::Normal))
            .unwrap();

        let recorded = record_sighting(&store, sighting("ba 12 pa 1234")).unwrap();
        assert_eq!(recorded.sighting.vehicle_id, Some(stored.id));
    }

    #[test]
    fn rejects_invalid_fields_before_writing() {
        let store = MemoryDatastore::new();

        let mut input = sighting("  ");
        let err = record_sighting(&store, input).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Validation {
                field: "plate_number",
                ..
            }
        ));

        input = sighting("बा १२ प १२३४");
        input.latitude = 91.0;
        let err = record_sighting(&store, input).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Validation { field: "latitude", .. }
        ));

        input = sighting("बा १२ प १२३४");
        input.longitude = -200.0;
        let err = record_sighting(&store, input).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Validation { field: "longitude", .. }
        ));

        input = sighting("बा १२ प १२३४");
        input.latitude = f64::NAN;
        assert!(record_sighting(&store, input).is_err());

        let since = Utc::now() - Duration::minutes(10);
        assert!(store.recent_sightings(&query(since)).unwrap().is_empty());
    }
}
