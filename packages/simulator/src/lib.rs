#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Continuous ANPR feed simulator.
//!
//! Maintains a fixed pool of Nepali-format plates backed by vehicle rows
//! and emits randomized sightings for them through the ingestion
//! pipeline, exercising the same alerting path as live camera traffic.

pub mod names;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use platewatch_datastore::{Datastore, StoreError};
use platewatch_datastore_models::{NewSighting, NewVehicle, Vehicle, VehicleUpdate};
use platewatch_ingest::{IngestError, RecordedSighting, record_sighting};
use platewatch_plates::{PlateError, PlateFormat, extract_province, generate_unique};
use platewatch_vehicle_models::VehicleStatus;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::names::{Gender, pick_devanagari_name};

/// Share of pool vehicles seeded as stolen.
const STOLEN_SHARE: f64 = 0.05;
/// Share of pool vehicles seeded as stolen or suspicious combined.
const FLAGGED_SHARE: f64 = 0.20;

const COLORS: [&str; 5] = ["white", "black", "red", "blue", "silver"];
const VEHICLE_TYPES: [&str; 4] = ["sedan", "suv", "truck", "van"];

/// Demo feed centre, roughly Kathmandu.
const CENTER_LAT: f64 = 27.7172;
const CENTER_LON: f64 = 85.3240;
const COORD_JITTER: f64 = 0.03;

/// Simulator tuning knobs.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Number of unique plates in the pool.
    pub pool_size: usize,
    /// Delay between emitted sightings.
    pub interval: Duration,
    /// Format for newly generated pool plates.
    pub prefer: PlateFormat,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            interval: Duration::from_secs(2),
            prefer: PlateFormat::Provincial,
        }
    }
}

/// Errors that can stop the simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// Vehicle read or write failure while building the pool.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Pool plate generation ran out of attempts.
    #[error("Plate generation error: {0}")]
    Plate(#[from] PlateError),

    /// The emitted sighting was rejected or failed to persist.
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),
}

/// A fixed pool of simulator plates, each backed by a vehicle row.
/// Built once and then passed by reference to every tick.
#[derive(Debug, Clone)]
pub struct SimulatorPool {
    plates: Vec<String>,
}

fn pick_status(rng: &mut impl Rng) -> VehicleStatus {
    let r = rng.gen_range(0.0..1.0);
    if r < STOLEN_SHARE {
        VehicleStatus::Stolen
    } else if r < FLAGGED_SHARE {
        VehicleStatus::Suspicious
    } else {
        VehicleStatus::Normal
    }
}

/// Refreshes a pre-existing pool vehicle. An ASCII-only owner is a
/// seeding placeholder and gets replaced with the Devanagari name.
fn refresh_pool_vehicle(
    store: &dyn Datastore,
    vehicle: &Vehicle,
    owner: String,
    status: VehicleStatus,
) -> Result<(), SimulatorError> {
    let mut update = VehicleUpdate::default();
    if vehicle.owner.trim().is_empty() || vehicle.owner.chars().all(|ch| ch.is_ascii()) {
        update.owner = Some(owner);
    }
    if vehicle.status != status {
        update.status = Some(status);
    }
    if update != VehicleUpdate::default() {
        store.update_vehicle(vehicle.id, &update)?;
    }
    Ok(())
}

impl SimulatorPool {
    /// Builds the pool, generating fresh unique plates and creating or
    /// refreshing their vehicle rows. Roughly 80% of seeded vehicles are
    /// normal, 15% suspicious, 5% stolen.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError`] if plate generation exhausts its
    /// attempts or a vehicle write fails.
    pub fn build(
        store: &dyn Datastore,
        config: &SimulatorConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, SimulatorError> {
        let mut existing: HashSet<String> = store
            .list_vehicles(None)?
            .into_iter()
            .map(|vehicle| vehicle.plate_number)
            .collect();

        let size = config.pool_size.max(1);
        let mut plates = Vec::with_capacity(size);
        for _ in 0..size {
            let plate = generate_unique(rng, config.prefer, &existing)?;
            existing.insert(plate.clone());

            let province = extract_province(&plate);
            let gender = if rng.gen_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            };
            let owner = pick_devanagari_name(rng, province.as_deref(), gender);
            let status = pick_status(rng);

            match store.vehicle_by_plate(&plate)? {
                None => {
                    store.insert_vehicle(NewVehicle {
                        plate_number: plate.clone(),
                        status,
                        owner,
                        notes: "Simulator pool".to_string(),
                    })?;
                }
                Some(vehicle) => refresh_pool_vehicle(store, &vehicle, owner, status)?,
            }
            plates.push(plate);
        }

        Ok(Self { plates })
    }

    /// Plates in the pool.
    #[must_use]
    pub fn plates(&self) -> &[String] {
        &self.plates
    }
}

/// Emits one randomized sighting for a pool plate through the ingestion
/// pipeline.
///
/// # Errors
///
/// Returns [`SimulatorError`] if the vehicle lookup or the sighting
/// write fails.
pub fn tick(
    store: &dyn Datastore,
    pool: &SimulatorPool,
    rng: &mut impl Rng,
) -> Result<RecordedSighting, SimulatorError> {
    let plate = &pool.plates[rng.gen_range(0..pool.plates.len())];
    let vehicle_id = store.vehicle_by_plate(plate)?.map(|vehicle| vehicle.id);

    let sighting = NewSighting {
        plate_number: plate.clone(),
        vehicle_id,
        vehicle_type: VEHICLE_TYPES[rng.gen_range(0..VEHICLE_TYPES.len())].to_string(),
        color: COLORS[rng.gen_range(0..COLORS.len())].to_string(),
        latitude: CENTER_LAT + rng.gen_range(-COORD_JITTER..COORD_JITTER),
        longitude: CENTER_LON + rng.gen_range(-COORD_JITTER..COORD_JITTER),
        speed_kmh: rng.gen_range(10.0..80.0),
        heading_deg: rng.gen_range(0.0..360.0),
        timestamp: None,
    };

    let recorded = record_sighting(store, sighting)?;
    log::debug!(
        "Sighted {plate} at {:.5},{:.5} speed={:.1} heading={:.1}",
        recorded.sighting.latitude,
        recorded.sighting.longitude,
        recorded.sighting.speed_kmh,
        recorded.sighting.heading_deg
    );
    Ok(recorded)
}

/// Runs the simulator until the owning task is dropped, emitting one
/// sighting per interval. Per-tick failures are logged and skipped.
pub async fn run(store: Arc<dyn Datastore>, pool: SimulatorPool, interval: Duration) {
    log::info!(
        "Starting ANPR simulator: {} plates, one sighting per {interval:?}",
        pool.plates.len()
    );

    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(e) = tick(store.as_ref(), &pool, &mut rng) {
            log::error!("Simulator tick failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platewatch_datastore::memory::MemoryDatastore;
    use platewatch_plates::is_valid_plate;

    fn config(pool_size: usize) -> SimulatorConfig {
        SimulatorConfig {
            pool_size,
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn pool_builds_requested_size_with_vehicle_rows() {
        let store = MemoryDatastore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let pool = SimulatorPool::build(&store, &config(4), &mut rng).unwrap();

        assert_eq!(pool.plates().len(), 4);
        for plate in pool.plates() {
            assert!(is_valid_plate(plate));
            let vehicle = store.vehicle_by_plate(plate).unwrap().unwrap();
            assert_eq!(vehicle.notes, "Simulator pool");
            assert!(vehicle.owner.chars().any(|ch| !ch.is_ascii()));
        }
    }

    #[test]
    fn pool_avoids_existing_plates_and_duplicates() {
        let store = MemoryDatastore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let first = SimulatorPool::build(&store, &config(5), &mut rng).unwrap();
        let second = SimulatorPool::build(&store, &config(5), &mut rng).unwrap();

        let mut seen: HashSet<&str> = HashSet::new();
        for plate in first.plates().iter().chain(second.plates()) {
            assert!(seen.insert(plate.as_str()), "duplicate pool plate {plate}");
        }
        assert_eq!(store.list_vehicles(None).unwrap().len(), 10);
    }

    #[test]
    fn refresh_replaces_placeholder_owner_and_status() {
        let store = MemoryDatastore::new();
        let vehicle = store
            .insert_vehicle(NewVehicle {
                plate_number: "बा १२ प १२३४".to_string(),
                status: VehicleStatus::Normal,
                owner: "Seed Owner".to_string(),
                notes: String::new(),
            })
            .unwrap();

        refresh_pool_vehicle(
            &store,
            &vehicle,
            "राम बहादुर श्रेष्ठ".to_string(),
            VehicleStatus::Stolen,
        )
        .unwrap();

        let refreshed = store.vehicle_by_id(vehicle.id).unwrap().unwrap();
        assert_eq!(refreshed.owner, "राम बहादुर श्रेष्ठ");
        assert_eq!(refreshed.status, VehicleStatus::Stolen);
    }

    #[test]
    fn refresh_keeps_devanagari_owner() {
        let store = MemoryDatastore::new();
        let vehicle = store
            .insert_vehicle(NewVehicle {
                plate_number: "बा १२ प १२३४".to_string(),
                status: VehicleStatus::Normal,
                owner: "सीता देवी राई".to_string(),
                notes: String::new(),
            })
            .unwrap();

        refresh_pool_vehicle(
            &store,
            &vehicle,
            "राम बहादुर श्रेष्ठ".to_string(),
            VehicleStatus::Normal,
        )
        .unwrap();

        let refreshed = store.vehicle_by_id(vehicle.id).unwrap().unwrap();
        assert_eq!(refreshed.owner, "सीता देवी राई");
    }

    #[test]
    fn tick_emits_sighting_for_a_pool_plate() {
        let store = MemoryDatastore::new();
        let mut rng = StdRng::seed_from_u64(21);
        let pool = SimulatorPool::build(&store, &config(3), &mut rng).unwrap();

        let recorded = tick(&store, &pool, &mut rng).unwrap();
        let sighting = &recorded.sighting;

        assert!(pool.plates().contains(&sighting.plate_number));
        assert!(recorded.outcome.vehicle_id.is_some());
        assert!((sighting.latitude - CENTER_LAT).abs() <= COORD_JITTER);
        assert!((sighting.longitude - CENTER_LON).abs() <= COORD_JITTER);
        assert!((10.0..80.0).contains(&sighting.speed_kmh));
        assert!((0.0..360.0).contains(&sighting.heading_deg));
        assert!(COLORS.contains(&sighting.color.as_str()));
        assert!(VEHICLE_TYPES.contains(&sighting.vehicle_type.as_str()));
    }

    #[test]
    fn tick_drives_alerting_for_flagged_pool_vehicles() {
        let store = MemoryDatastore::new();
        store
            .insert_vehicle(NewVehicle {
                plate_number: "बा १२ प १२३४".to_string(),
                status: VehicleStatus::Stolen,
                owner: "राम बहादुर श्रेष्ठ".to_string(),
                notes: "Simulator pool".to_string(),
            })
            .unwrap();
        let pool = SimulatorPool {
            plates: vec!["बा १२ प १२३४".to_string()],
        };

        let mut rng = StdRng::seed_from_u64(2);
        let recorded = tick(&store, &pool, &mut rng).unwrap();

        let alert = recorded.outcome.alert.unwrap();
        assert_eq!(alert.plate_number, "बा १२ प १२३४");
        assert!(recorded.outcome.route.is_some());
    }

    #[test]
    fn default_config_matches_the_server_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.prefer, PlateFormat::Provincial);
    }
}
