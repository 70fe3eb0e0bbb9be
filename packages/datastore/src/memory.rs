//! In-memory datastore backed by a single `RwLock`.
//!
//! Rows live in plain vectors with auto-incremented ids. The sighting
//! hook runs under the write lock, so everything it does is atomic with
//! the sighting insert; on hook failure the touched rows are restored
//! from an undo log and the error is surfaced unchanged. Id counters
//! are not rewound, they only ever move forward.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use platewatch_datastore_models::{
    Alert, NewAlert, NewPredictedRoute, NewRegistration, NewSighting, NewStolenReport,
    NewVehicle, NewVerificationAttempt, NewWatchlistEntry, OwnerWatchlist,
    PoliceVehicleRegistration, PredictedRoute, RecentQuery, Sighting, StolenVehicleReport,
    Vehicle, VehicleUpdate, VerificationAttempt,
};
use platewatch_vehicle_models::VehicleStatus;

use crate::{Datastore, SightingHook, SightingTxn, StoreError};

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend {
        message: format!("poisoned lock during {context}"),
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct Counters {
    vehicles: i64,
    sightings: i64,
    alerts: i64,
    routes: i64,
    registrations: i64,
    stolen_reports: i64,
    watchlist: i64,
    attempts: i64,
}

#[derive(Default)]
struct Tables {
    counters: Counters,
    vehicles: Vec<Vehicle>,
    sightings: Vec<Sighting>,
    alerts: Vec<Alert>,
    routes: Vec<PredictedRoute>,
    registrations: Vec<PoliceVehicleRegistration>,
    stolen_reports: Vec<StolenVehicleReport>,
    watchlist: Vec<OwnerWatchlist>,
    attempts: Vec<VerificationAttempt>,
}

fn insert_alert_row(tables: &mut Tables, alert: NewAlert) -> Alert {
    let id = next_id(&mut tables.counters.alerts);
    let row = Alert {
        id,
        plate_number: alert.plate_number,
        vehicle_id: alert.vehicle_id,
        status: alert.status,
        timestamp: alert.timestamp,
        predicted_latitude: alert.predicted_latitude,
        predicted_longitude: alert.predicted_longitude,
        message: alert.message,
        acknowledged: false,
        dispatched: false,
        created_at: Utc::now(),
    };
    tables.alerts.push(row.clone());
    row
}

fn insert_route_row(tables: &mut Tables, route: NewPredictedRoute) -> PredictedRoute {
    let id = next_id(&mut tables.counters.routes);
    let row = PredictedRoute {
        id,
        plate_number: route.plate_number,
        path: route.path,
        generated_at: route.generated_at,
    };
    tables.routes.push(row.clone());
    row
}

/// [`SightingTxn`] over the write-locked tables. Vehicle rows are saved
/// before their first mutation so a failed hook can restore them.
struct MemoryTxn<'a> {
    tables: &'a mut Tables,
    saved_vehicles: Vec<Vehicle>,
}

impl MemoryTxn<'_> {
    fn save_vehicle_once(&mut self, id: i64) {
        if self.saved_vehicles.iter().any(|v| v.id == id) {
            return;
        }
        if let Some(vehicle) = self.tables.vehicles.iter().find(|v| v.id == id) {
            self.saved_vehicles.push(vehicle.clone());
        }
    }
}

impl SightingTxn for MemoryTxn<'_> {
    fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.tables.vehicles.iter().find(|v| v.id == id).cloned())
    }

    fn vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .tables
            .vehicles
            .iter()
            .find(|v| eq_ignore_case(&v.plate_number, plate))
            .cloned())
    }

    fn link_vehicle(&mut self, sighting_id: i64, vehicle_id: i64) -> Result<(), StoreError> {
        let Some(sighting) = self
            .tables
            .sightings
            .iter_mut()
            .find(|s| s.id == sighting_id)
        else {
            return Err(StoreError::NotFound {
                entity: "sighting",
                id: sighting_id,
            });
        };
        sighting.vehicle_id = Some(vehicle_id);
        Ok(())
    }

    fn touch_last_seen(
        &mut self,
        vehicle_id: i64,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.save_vehicle_once(vehicle_id);
        let Some(vehicle) = self
            .tables
            .vehicles
            .iter_mut()
            .find(|v| v.id == vehicle_id)
        else {
            return Err(StoreError::NotFound {
                entity: "vehicle",
                id: vehicle_id,
            });
        };
        vehicle.last_seen = Some(seen_at);
        vehicle.updated_at = Utc::now();
        Ok(())
    }

    fn insert_alert(&mut self, alert: NewAlert) -> Result<Alert, StoreError> {
        Ok(insert_alert_row(self.tables, alert))
    }

    fn insert_route(&mut self, route: NewPredictedRoute) -> Result<PredictedRoute, StoreError> {
        Ok(insert_route_row(self.tables, route))
    }
}

/// Thread-safe in-memory [`Datastore`].
pub struct MemoryDatastore {
    tables: RwLock<Tables>,
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatastore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| lock_err("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| lock_err("write"))
    }
}

impl Datastore for MemoryDatastore {
    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StoreError> {
        let mut tables = self.write()?;
        if tables
            .vehicles
            .iter()
            .any(|v| v.plate_number == vehicle.plate_number)
        {
            return Err(StoreError::DuplicateKey {
                entity: "vehicle",
                key: vehicle.plate_number,
            });
        }
        let id = next_id(&mut tables.counters.vehicles);
        let now = Utc::now();
        let row = Vehicle {
            id,
            plate_number: vehicle.plate_number,
            status: vehicle.status,
            owner: vehicle.owner,
            last_seen: None,
            notes: vehicle.notes,
            created_at: now,
            updated_at: now,
        };
        tables.vehicles.push(row.clone());
        Ok(row)
    }

    fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StoreError> {
        let tables = self.read()?;
        Ok(tables.vehicles.iter().find(|v| v.id == id).cloned())
    }

    fn vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .vehicles
            .iter()
            .find(|v| eq_ignore_case(&v.plate_number, plate))
            .cloned())
    }

    fn list_vehicles(&self, status: Option<VehicleStatus>) -> Result<Vec<Vehicle>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<Vehicle> = tables
            .vehicles
            .iter()
            .filter(|v| status.is_none_or(|s| v.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
        Ok(rows)
    }

    fn update_vehicle(&self, id: i64, update: &VehicleUpdate) -> Result<Vehicle, StoreError> {
        let mut tables = self.write()?;
        let Some(vehicle) = tables.vehicles.iter_mut().find(|v| v.id == id) else {
            return Err(StoreError::NotFound {
                entity: "vehicle",
                id,
            });
        };
        if let Some(status) = update.status {
            vehicle.status = status;
        }
        if let Some(owner) = &update.owner {
            vehicle.owner.clone_from(owner);
        }
        if let Some(notes) = &update.notes {
            vehicle.notes.clone_from(notes);
        }
        if let Some(last_seen) = update.last_seen {
            vehicle.last_seen = Some(last_seen);
        }
        vehicle.updated_at = Utc::now();
        Ok(vehicle.clone())
    }

    fn delete_vehicle(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let before = tables.vehicles.len();
        tables.vehicles.retain(|v| v.id != id);
        if tables.vehicles.len() == before {
            return Err(StoreError::NotFound {
                entity: "vehicle",
                id,
            });
        }
        for sighting in &mut tables.sightings {
            if sighting.vehicle_id == Some(id) {
                sighting.vehicle_id = None;
            }
        }
        for alert in &mut tables.alerts {
            if alert.vehicle_id == Some(id) {
                alert.vehicle_id = None;
            }
        }
        log::debug!("Deleted vehicle {id} and nulled its references");
        Ok(())
    }

    fn create_sighting(
        &self,
        sighting: NewSighting,
        hook: SightingHook<'_>,
    ) -> Result<Sighting, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.counters.sightings);
        let row = Sighting {
            id,
            plate_number: sighting.plate_number,
            vehicle_id: sighting.vehicle_id,
            vehicle_type: sighting.vehicle_type,
            color: sighting.color,
            latitude: sighting.latitude,
            longitude: sighting.longitude,
            speed_kmh: sighting.speed_kmh,
            heading_deg: sighting.heading_deg,
            timestamp: sighting.timestamp.unwrap_or_else(Utc::now),
        };
        tables.sightings.push(row.clone());

        let alerts_len = tables.alerts.len();
        let routes_len = tables.routes.len();
        let mut txn = MemoryTxn {
            tables: &mut *tables,
            saved_vehicles: Vec::new(),
        };
        let hook_result = hook(&mut txn, &row);
        let saved_vehicles = txn.saved_vehicles;

        if let Err(e) = hook_result {
            tables.alerts.truncate(alerts_len);
            tables.routes.truncate(routes_len);
            for original in saved_vehicles {
                if let Some(slot) = tables.vehicles.iter_mut().find(|v| v.id == original.id) {
                    *slot = original;
                }
            }
            tables.sightings.retain(|s| s.id != id);
            return Err(e);
        }

        // The hook may have linked the row, return the stored version.
        tables
            .sightings
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "sighting",
                id,
            })
    }

    fn recent_sightings(&self, query: &RecentQuery) -> Result<Vec<Sighting>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<Sighting> = tables
            .sightings
            .iter()
            .filter(|s| s.timestamp >= query.since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(query.limit);
        Ok(rows)
    }

    fn count_sightings_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .sightings
            .iter()
            .filter(|s| s.timestamp >= since)
            .count())
    }

    fn distinct_plates_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError> {
        let tables = self.read()?;
        let plates: HashSet<&str> = tables
            .sightings
            .iter()
            .filter(|s| s.timestamp >= since)
            .map(|s| s.plate_number.as_str())
            .collect();
        Ok(plates.len())
    }

    fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let mut tables = self.write()?;
        Ok(insert_alert_row(&mut tables, alert))
    }

    fn recent_alerts(&self, query: &RecentQuery) -> Result<Vec<Alert>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<Alert> = tables
            .alerts
            .iter()
            .filter(|a| a.timestamp >= query.since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(query.limit);
        Ok(rows)
    }

    fn count_alerts_since(&self, since: DateTime<Utc>) -> Result<usize, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .alerts
            .iter()
            .filter(|a| a.timestamp >= since)
            .count())
    }

    fn acknowledge_alert(&self, id: i64) -> Result<Alert, StoreError> {
        let mut tables = self.write()?;
        let Some(alert) = tables.alerts.iter_mut().find(|a| a.id == id) else {
            return Err(StoreError::NotFound {
                entity: "alert",
                id,
            });
        };
        alert.acknowledged = true;
        alert.dispatched = true;
        Ok(alert.clone())
    }

    fn insert_route(&self, route: NewPredictedRoute) -> Result<PredictedRoute, StoreError> {
        let mut tables = self.write()?;
        Ok(insert_route_row(&mut tables, route))
    }

    fn latest_route_for_plate(
        &self,
        plate: &str,
    ) -> Result<Option<PredictedRoute>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .routes
            .iter()
            .filter(|r| eq_ignore_case(&r.plate_number, plate))
            .max_by_key(|r| r.generated_at)
            .cloned())
    }

    fn recent_routes(&self, limit: usize) -> Result<Vec<PredictedRoute>, StoreError> {
        let tables = self.read()?;
        // Insertion order is generation order.
        Ok(tables.routes.iter().rev().take(limit).cloned().collect())
    }

    fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<PoliceVehicleRegistration, StoreError> {
        let mut tables = self.write()?;
        if tables
            .registrations
            .iter()
            .any(|r| r.registration_id == registration.registration_id)
        {
            return Err(StoreError::DuplicateKey {
                entity: "registration",
                key: registration.registration_id,
            });
        }
        let id = next_id(&mut tables.counters.registrations);
        let row = PoliceVehicleRegistration {
            id,
            registration_id: registration.registration_id,
            plate_number: registration.plate_number,
            make: registration.make,
            model: registration.model,
            owner_name: registration.owner_name,
            region_code: registration.region_code,
            registered_at: registration.registered_at,
            updated_at: Utc::now(),
        };
        tables.registrations.push(row.clone());
        Ok(row)
    }

    fn registration_by_plate(
        &self,
        plate: &str,
    ) -> Result<Option<PoliceVehicleRegistration>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .registrations
            .iter()
            .find(|r| eq_ignore_case(&r.plate_number, plate))
            .cloned())
    }

    fn insert_stolen_report(
        &self,
        report: NewStolenReport,
    ) -> Result<StolenVehicleReport, StoreError> {
        let mut tables = self.write()?;
        if tables
            .stolen_reports
            .iter()
            .any(|r| r.case_number == report.case_number)
        {
            return Err(StoreError::DuplicateKey {
                entity: "stolen report",
                key: report.case_number,
            });
        }
        let id = next_id(&mut tables.counters.stolen_reports);
        let row = StolenVehicleReport {
            id,
            case_number: report.case_number,
            plate_number: report.plate_number,
            registration_id: report.registration_id,
            report_timestamp: report.report_timestamp,
            status: report.status,
            region_code: report.region_code,
            details: report.details,
            created_at: Utc::now(),
        };
        tables.stolen_reports.push(row.clone());
        Ok(row)
    }

    fn open_stolen_reports(
        &self,
        plate: &str,
        registration_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<StolenVehicleReport>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<StolenVehicleReport> = tables
            .stolen_reports
            .iter()
            .filter(|r| r.status.is_open() && r.report_timestamp >= since)
            .filter(|r| {
                eq_ignore_case(&r.plate_number, plate)
                    || (registration_id.is_some() && r.registration_id == registration_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.report_timestamp.cmp(&a.report_timestamp));
        Ok(rows)
    }

    fn insert_watchlist_entry(
        &self,
        entry: NewWatchlistEntry,
    ) -> Result<OwnerWatchlist, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.counters.watchlist);
        let row = OwnerWatchlist {
            id,
            owner_name: entry.owner_name,
            reason: entry.reason,
            flagged_at: entry.flagged_at,
            active: entry.active,
        };
        tables.watchlist.push(row.clone());
        Ok(row)
    }

    fn active_watchlist_entry(
        &self,
        owner_name: &str,
    ) -> Result<Option<OwnerWatchlist>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .watchlist
            .iter()
            .find(|w| w.active && eq_ignore_case(&w.owner_name, owner_name))
            .cloned())
    }

    fn insert_verification_attempt(
        &self,
        attempt: NewVerificationAttempt,
    ) -> Result<VerificationAttempt, StoreError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.counters.attempts);
        let row = VerificationAttempt {
            id,
            input_payload: attempt.input_payload,
            matched_registration_id: attempt.matched_registration_id,
            matched_stolen_report_id: attempt.matched_stolen_report_id,
            matched_owner_watchlist_id: attempt.matched_owner_watchlist_id,
            match_status: attempt.match_status,
            flag_category: attempt.flag_category,
            confidence: attempt.confidence,
            verification_timestamp: attempt.verification_timestamp,
            response_time_ms: attempt.response_time_ms,
            reference_case_numbers: attempt.reference_case_numbers,
            message: attempt.message,
            created_at: Utc::now(),
        };
        tables.attempts.push(row.clone());
        Ok(row)
    }

    fn list_verification_attempts(
        &self,
        limit: usize,
    ) -> Result<Vec<VerificationAttempt>, StoreError> {
        let tables = self.read()?;
        // Insertion order is creation order.
        Ok(tables.attempts.iter().rev().take(limit).cloned().collect())
    }
}
