#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the platewatch ANPR backend.
//!
//! Serves the REST API for sighting ingestion, plate verification,
//! alert retrieval, and route prediction. All state lives in the
//! in-memory datastore; an optional background simulator feeds the
//! pipeline with synthetic camera traffic.

mod handlers;
pub mod interactive;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use platewatch_datastore::Datastore;
use platewatch_datastore::memory::MemoryDatastore;
use platewatch_plates::PlateFormat;
use platewatch_simulator::{SimulatorConfig, SimulatorPool};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Shared application state.
pub struct AppState {
    /// Datastore every handler reads and writes through.
    pub store: Arc<dyn Datastore>,
}

/// Server settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, from `BIND_ADDR` (default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind, from `PORT` (default `8080`).
    pub port: u16,
    /// Whether to run the background feed simulator, from `SIMULATOR`.
    pub simulator: bool,
    /// Delay between simulated sightings, from `SIMULATOR_INTERVAL_MS`.
    pub simulator_interval: Duration,
    /// Plate pool size for the simulator, from `SIMULATOR_POOL_SIZE`.
    pub simulator_pool_size: usize,
    /// Plate format the simulator generates, from `SIMULATOR_PREFER`.
    pub simulator_prefer: PlateFormat,
}

impl ServerConfig {
    /// Reads settings from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let interval_ms: u64 = std::env::var("SIMULATOR_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2000);
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            simulator: std::env::var("SIMULATOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            simulator_interval: Duration::from_millis(interval_ms.max(1)),
            simulator_pool_size: std::env::var("SIMULATOR_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            simulator_prefer: std::env::var("SIMULATOR_PREFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn start_simulator(config: &ServerConfig, store: Arc<dyn Datastore>) {
    let sim_config = SimulatorConfig {
        pool_size: config.simulator_pool_size,
        interval: config.simulator_interval,
        prefer: config.simulator_prefer,
    };
    let mut rng = StdRng::from_entropy();
    match SimulatorPool::build(store.as_ref(), &sim_config, &mut rng) {
        Ok(pool) => {
            tokio::spawn(platewatch_simulator::run(store, pool, sim_config.interval));
        }
        Err(e) => log::error!("Failed to build simulator pool: {e}"),
    }
}

/// Starts the platewatch API server.
///
/// Initializes the in-memory datastore, optionally launches the feed
/// simulator, and starts the Actix-Web HTTP server. This is a regular
/// async function — the caller is responsible for providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let store: Arc<dyn Datastore> = Arc::new(MemoryDatastore::new());

    if config.simulator {
        start_simulator(&config, Arc::clone(&store));
    }

    let state = web::Data::new(AppState { store });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let detail = err.to_string();
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({
                    "detail": "Invalid payload",
                    "errors": detail,
                })),
            )
            .into()
        });

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(json_config)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/verify", web::post().to(handlers::verify))
                    .route("/sightings", web::post().to(handlers::create_sighting))
                    .route(
                        "/sightings/recent",
                        web::get().to(handlers::recent_sightings),
                    )
                    .route("/alerts/recent", web::get().to(handlers::recent_alerts))
                    .route(
                        "/alerts/{id}/acknowledge",
                        web::get().to(handlers::acknowledge_alert),
                    )
                    .route(
                        "/alerts/{id}/acknowledge",
                        web::post().to(handlers::acknowledge_alert),
                    )
                    .route("/stats", web::get().to(handlers::stats))
                    .route("/dataset", web::get().to(handlers::dataset))
                    .route("/vehicles", web::get().to(handlers::list_vehicles))
                    .route("/vehicles/{id}", web::get().to(handlers::get_vehicle))
                    .route("/vehicles/{id}", web::delete().to(handlers::delete_vehicle))
                    .route(
                        "/vehicles/{id}/predicted",
                        web::get().to(handlers::vehicle_predicted),
                    )
                    .route("/routes", web::get().to(handlers::list_routes)),
            )
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
