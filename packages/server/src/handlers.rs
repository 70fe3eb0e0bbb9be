//! HTTP handler functions for the platewatch API.

use actix_web::{HttpResponse, web};
use chrono::{Duration, Utc};
use platewatch_datastore::{Datastore, StoreError};
use platewatch_datastore_models::{NewSighting, RecentQuery, Sighting, Vehicle};
use platewatch_ingest::{IngestError, record_sighting};
use platewatch_server_models::{
    ApiAlert, ApiHealth, ApiRoute, ApiSighting, ApiStats, ApiVehicle, DatasetParams,
    DatasetResponse, RecentParams, SightingBody, VehicleListParams, VerifyBody,
};
use platewatch_vehicle_models::VehicleStatus;
use platewatch_verify::{VerificationRequest, verify_vehicle};

use crate::AppState;

/// Hard cap on rows returned by the recent sightings endpoint.
const RECENT_SIGHTINGS_CAP: usize = 500;
/// Hard cap on rows returned by the recent alerts endpoint.
const RECENT_ALERTS_CAP: usize = 200;
/// Default recent sightings window, in minutes.
const DEFAULT_SIGHTING_MINUTES: i64 = 10;
/// Default recent alerts window, in minutes.
const DEFAULT_ALERT_MINUTES: i64 = 60;
/// Maximum number of snapshots returned by the route listing.
const ROUTES_CAP: usize = 100;

fn storage_error(context: &'static str, e: &StoreError) -> HttpResponse {
    log::error!("{context}: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": context }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "detail": "Not found." }))
}

fn resolve_vehicle(store: &dyn Datastore, vehicle_id: Option<i64>) -> Option<Vehicle> {
    vehicle_id.and_then(|id| store.vehicle_by_id(id).ok().flatten())
}

fn to_api_sightings(store: &dyn Datastore, rows: Vec<Sighting>) -> Vec<ApiSighting> {
    rows.into_iter()
        .map(|row| {
            let vehicle = resolve_vehicle(store, row.vehicle_id);
            ApiSighting::with_vehicle(row, vehicle)
        })
        .collect()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/verify`
///
/// Runs the verification engine against the request payload.
pub async fn verify(state: web::Data<AppState>, body: web::Json<VerifyBody>) -> HttpResponse {
    let body = body.into_inner();
    if body.plate_number.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Invalid payload",
            "errors": { "plate_number": ["This field may not be blank."] },
        }));
    }

    let request = VerificationRequest {
        plate_number: Some(body.plate_number),
        make: body.make,
        model: body.model,
        owner_name: body.owner_name,
        region_code: body.region_code,
        timestamp: body.timestamp,
    };
    match verify_vehicle(state.store.as_ref(), &request) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => {
            log::error!("Verification failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Verification failed"
            }))
        }
    }
}

/// `POST /api/sightings`
///
/// Records a sighting and runs the alerting reactor; responds with the
/// stored row once the whole unit has committed.
pub async fn create_sighting(
    state: web::Data<AppState>,
    body: web::Json<SightingBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let sighting = NewSighting {
        plate_number: body.plate_number,
        vehicle_id: body.vehicle_id,
        vehicle_type: body.vehicle_type.unwrap_or_default(),
        color: body.color.unwrap_or_default(),
        latitude: body.latitude,
        longitude: body.longitude,
        speed_kmh: body.speed_kmh.unwrap_or(0.0),
        heading_deg: body.heading_deg.unwrap_or(0.0),
        timestamp: body.timestamp,
    };

    match record_sighting(state.store.as_ref(), sighting) {
        Ok(recorded) => {
            let vehicle = resolve_vehicle(state.store.as_ref(), recorded.sighting.vehicle_id);
            HttpResponse::Created().json(ApiSighting::with_vehicle(recorded.sighting, vehicle))
        }
        Err(IngestError::Validation { field, message }) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "detail": "Invalid payload",
                "errors": { (field): [message] },
            }))
        }
        Err(IngestError::Store(e)) => storage_error("Failed to record sighting", &e),
    }
}

/// `GET /api/sightings/recent`
///
/// Sightings from the last `minutes` (default 10), newest first.
pub async fn recent_sightings(
    state: web::Data<AppState>,
    params: web::Query<RecentParams>,
) -> HttpResponse {
    let minutes = params.minutes.unwrap_or(DEFAULT_SIGHTING_MINUTES);
    let since = Utc::now() - Duration::minutes(minutes);
    match state
        .store
        .recent_sightings(&RecentQuery::new(since, RECENT_SIGHTINGS_CAP))
    {
        Ok(rows) => {
            log::info!("Recent sightings: minutes={minutes} count={}", rows.len());
            HttpResponse::Ok().json(to_api_sightings(state.store.as_ref(), rows))
        }
        Err(e) => storage_error("Failed to query sightings", &e),
    }
}

/// `GET /api/alerts/recent`
///
/// Alerts from the last `minutes` (default 60), newest first.
pub async fn recent_alerts(
    state: web::Data<AppState>,
    params: web::Query<RecentParams>,
) -> HttpResponse {
    let minutes = params.minutes.unwrap_or(DEFAULT_ALERT_MINUTES);
    let since = Utc::now() - Duration::minutes(minutes);
    match state
        .store
        .recent_alerts(&RecentQuery::new(since, RECENT_ALERTS_CAP))
    {
        Ok(rows) => {
            log::info!("Recent alerts: minutes={minutes} count={}", rows.len());
            let alerts: Vec<ApiAlert> = rows.into_iter().map(ApiAlert::from).collect();
            HttpResponse::Ok().json(alerts)
        }
        Err(e) => storage_error("Failed to query alerts", &e),
    }
}

/// `GET|POST /api/alerts/{id}/acknowledge`
///
/// Acknowledging also marks the alert dispatched.
pub async fn acknowledge_alert(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match state.store.acknowledge_alert(path.into_inner()) {
        Ok(alert) => HttpResponse::Ok().json(ApiAlert::from(alert)),
        Err(StoreError::NotFound { .. }) => not_found(),
        Err(e) => storage_error("Failed to acknowledge alert", &e),
    }
}

/// `GET /api/stats`
///
/// Dashboard counters: 24h scan and alert volumes plus distinct plates
/// seen in the last five minutes.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let now = Utc::now();
    let since_24h = now - Duration::hours(24);
    let since_5m = now - Duration::minutes(5);

    let result = state
        .store
        .count_sightings_since(since_24h)
        .and_then(|vehicles_scanned_24h| {
            let alerts_triggered_24h = state.store.count_alerts_since(since_24h)?;
            let total_vehicles_online = state.store.distinct_plates_since(since_5m)?;
            Ok(ApiStats {
                vehicles_scanned_24h,
                alerts_triggered_24h,
                total_vehicles_online,
            })
        });

    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => storage_error("Failed to compute stats", &e),
    }
}

/// `GET /api/dataset`
///
/// Unified payload with vehicles, recent sightings, and recent alerts.
pub async fn dataset(state: web::Data<AppState>, params: web::Query<DatasetParams>) -> HttpResponse {
    let minutes_sightings = params.minutes_sightings.unwrap_or(60);
    let minutes_alerts = params.minutes_alerts.unwrap_or(120);
    let limit_sightings = params.limit_sightings.unwrap_or(500);
    let limit_alerts = params.limit_alerts.unwrap_or(200);

    let now = Utc::now();
    let result = state.store.list_vehicles(None).and_then(|vehicles| {
        let sightings = state.store.recent_sightings(&RecentQuery::new(
            now - Duration::minutes(minutes_sightings),
            limit_sightings,
        ))?;
        let alerts = state.store.recent_alerts(&RecentQuery::new(
            now - Duration::minutes(minutes_alerts),
            limit_alerts,
        ))?;
        Ok((vehicles, sightings, alerts))
    });

    match result {
        Ok((vehicles, sightings, alerts)) => {
            log::info!(
                "Dataset: windows=({minutes_sightings}m,{minutes_alerts}m) counts=({},{},{})",
                vehicles.len(),
                sightings.len(),
                alerts.len()
            );
            HttpResponse::Ok().json(DatasetResponse {
                vehicles: vehicles.into_iter().map(ApiVehicle::from).collect(),
                sightings: to_api_sightings(state.store.as_ref(), sightings),
                alerts: alerts.into_iter().map(ApiAlert::from).collect(),
                source: "api".to_string(),
            })
        }
        Err(e) => storage_error("Failed to build dataset", &e),
    }
}

/// `GET /api/vehicles`
///
/// Lists vehicles ordered by plate, optionally filtered by status. An
/// unknown status name matches nothing.
pub async fn list_vehicles(
    state: web::Data<AppState>,
    params: web::Query<VehicleListParams>,
) -> HttpResponse {
    let filter = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<VehicleStatus>() {
            Ok(status) => Some(status),
            Err(_) => return HttpResponse::Ok().json(Vec::<ApiVehicle>::new()),
        },
    };

    match state.store.list_vehicles(filter) {
        Ok(rows) => {
            let vehicles: Vec<ApiVehicle> = rows.into_iter().map(ApiVehicle::from).collect();
            HttpResponse::Ok().json(vehicles)
        }
        Err(e) => storage_error("Failed to list vehicles", &e),
    }
}

/// `GET /api/vehicles/{id}`
pub async fn get_vehicle(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match state.store.vehicle_by_id(path.into_inner()) {
        Ok(Some(vehicle)) => HttpResponse::Ok().json(ApiVehicle::from(vehicle)),
        Ok(None) => not_found(),
        Err(e) => storage_error("Failed to load vehicle", &e),
    }
}

/// `DELETE /api/vehicles/{id}`
pub async fn delete_vehicle(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match state.store.delete_vehicle(path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(StoreError::NotFound { .. }) => not_found(),
        Err(e) => storage_error("Failed to delete vehicle", &e),
    }
}

/// `GET /api/vehicles/{id}/predicted`
///
/// Latest route snapshot for the vehicle's plate, or a placeholder with
/// an empty path.
pub async fn vehicle_predicted(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let vehicle = match state.store.vehicle_by_id(path.into_inner()) {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => return not_found(),
        Err(e) => return storage_error("Failed to load vehicle", &e),
    };

    match state.store.latest_route_for_plate(&vehicle.plate_number) {
        Ok(Some(route)) => HttpResponse::Ok().json(ApiRoute::from(route)),
        Ok(None) => HttpResponse::Ok().json(ApiRoute::empty(&vehicle.plate_number)),
        Err(e) => storage_error("Failed to load route", &e),
    }
}

/// `GET /api/routes`
///
/// Most recent route snapshots, newest first.
pub async fn list_routes(state: web::Data<AppState>) -> HttpResponse {
    match state.store.recent_routes(ROUTES_CAP) {
        Ok(rows) => {
            let routes: Vec<ApiRoute> = rows.into_iter().map(ApiRoute::from).collect();
            HttpResponse::Ok().json(routes)
        }
        Err(e) => storage_error("Failed to list routes", &e),
    }
}
