#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Storage trait and backends for the vehicle tracking pipeline.
//!
//! The [`Datastore`] trait is the persistence seam for every component:
//! the verification engine, the sighting reactor, and the HTTP query
//! surface all speak to storage through it. The bundled backend is the
//! in-memory [`memory::MemoryDatastore`].

pub mod memory;

use chrono::{DateTime, Utc};
use platewatch_datastore_models::{
    Alert, NewAlert, NewPredictedRoute, NewRegistration, NewSighting, NewStolenReport,
    NewVehicle, NewVerificationAttempt, NewWatchlistEntry, OwnerWatchlist,
    PoliceVehicleRegistration, PredictedRoute, RecentQuery, Sighting, StolenVehicleReport,
    Vehicle, VehicleUpdate, VerificationAttempt,
};
use platewatch_vehicle_models::VehicleStatus;

/// Errors that can occur during datastore operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row referenced by id does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"vehicle"`.
        entity: &'static str,
        /// The id that missed.
        id: i64,
    },

    /// A unique column would be violated by the insert.
    #[error("duplicate {entity} key: {key}")]
    DuplicateKey {
        /// Entity kind, e.g. `"vehicle"`.
        entity: &'static str,
        /// The value that collided.
        key: String,
    },

    /// Backend failure, e.g. a poisoned lock.
    #[error("storage backend error: {message}")]
    Backend {
        /// Description of what went wrong.
        message: String,
    },
}

/// Mutations available to a [`SightingHook`] while the sighting write is
/// still open. Everything done through this handle commits atomically
/// with the sighting, or not at all.
pub trait SightingTxn {
    /// Looks up a vehicle by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError>;

    /// Looks up a vehicle by case-insensitive exact plate match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError>;

    /// Sets the sighting's vehicle back-reference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the sighting row is gone.
    fn link_vehicle(&mut self, sighting_id: i64, vehicle_id: i64) -> Result<(), StoreError>;

    /// Overwrites the vehicle's `last_seen` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the vehicle does not exist.
    fn touch_last_seen(
        &mut self,
        vehicle_id: i64,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Inserts an alert in the same atomic unit as the sighting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_alert(&mut self, alert: NewAlert) -> Result<Alert, StoreError>;

    /// Inserts a route snapshot in the same atomic unit as the sighting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_route(&mut self, route: NewPredictedRoute) -> Result<PredictedRoute, StoreError>;
}

/// Callback run after a sighting row is created but before the write
/// commits. A hook error aborts the whole unit, sighting included.
pub type SightingHook<'a> =
    &'a mut dyn FnMut(&mut dyn SightingTxn, &Sighting) -> Result<(), StoreError>;

/// Persistence operations used across the pipeline.
///
/// Lookups by plate are case-insensitive exact matches; callers are
/// expected to normalize dash variants first. "Recent" queries return
/// newest rows first and never exceed their limit.
pub trait Datastore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the plate already exists.
    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError>;

    /// Lists vehicles ordered by plate, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn list_vehicles(&self, status: Option<VehicleStatus>) -> Result<Vec<Vehicle>, StoreError>;

    /// Applies the non-`None` fields of `update`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the vehicle does not exist.
    fn update_vehicle(&self, id: i64, update: &VehicleUpdate) -> Result<Vehicle, StoreError>;

    /// Deletes a vehicle and nulls every weak reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the vehicle does not exist.
    fn delete_vehicle(&self, id: i64) -> Result<(), StoreError>;

    /// Creates a sighting and runs `hook` inside the same atomic unit.
    /// The returned row reflects any linking the hook performed.
    ///
    /// # Errors
    ///
    /// Returns the hook's error unchanged if it fails; nothing is
    /// persisted in that case.
    fn create_sighting(
        &self,
        sighting: NewSighting,
        hook: SightingHook<'_>,
    ) -> Result<Sighting, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn recent_sightings(&self, query: &RecentQuery) -> Result<Vec<Sighting>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn count_sightings_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Counts distinct plate values sighted since `since`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn distinct_plates_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn recent_alerts(&self, query: &RecentQuery) -> Result<Vec<Alert>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn count_alerts_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Marks an alert acknowledged and dispatched. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the alert does not exist.
    fn acknowledge_alert(&self, id: i64) -> Result<Alert, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_route(&self, route: NewPredictedRoute) -> Result<PredictedRoute, StoreError>;

    /// Returns the most recently generated route for a plate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn latest_route_for_plate(&self, plate: &str) -> Result<Option<PredictedRoute>, StoreError>;

    /// Lists route snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn recent_routes(&self, limit: usize) -> Result<Vec<PredictedRoute>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the registration id
    /// already exists.
    fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<PoliceVehicleRegistration, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn registration_by_plate(
        &self,
        plate: &str,
    ) -> Result<Option<PoliceVehicleRegistration>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the case number already
    /// exists.
    fn insert_stolen_report(
        &self,
        report: NewStolenReport,
    ) -> Result<StolenVehicleReport, StoreError>;

    /// Open reports newer than `since` matching the plate
    /// (case-insensitive) or the registration id, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn open_stolen_reports(
        &self,
        plate: &str,
        registration_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<StolenVehicleReport>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_watchlist_entry(
        &self,
        entry: NewWatchlistEntry,
    ) -> Result<OwnerWatchlist, StoreError>;

    /// Finds an active watchlist entry by case-insensitive owner name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn active_watchlist_entry(
        &self,
        owner_name: &str,
    ) -> Result<Option<OwnerWatchlist>, StoreError>;

    /// Appends to the verification audit log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn insert_verification_attempt(
        &self,
        attempt: NewVerificationAttempt,
    ) -> Result<VerificationAttempt, StoreError>;

    /// Lists audit rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    fn list_verification_attempts(
        &self,
        limit: usize,
    ) -> Result<Vec<VerificationAttempt>, StoreError>;
}
