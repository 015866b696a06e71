#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the zoning map application.
//!
//! Builds the in-memory parcel spatial index once at startup, then
//! serves point, buffer, and text lookups plus the static frontend.
//! The index is immutable after the build, so handlers read it
//! concurrently without locking.

mod handlers;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use zoning_map_parcels::{ParcelIndex, ParcelsConfig};

/// Shared application state.
pub struct AppState {
    /// The parcel spatial index, built before the server binds.
    pub index: ParcelIndex,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Building parcel spatial index...");
    let index = ParcelIndex::from_config(ParcelsConfig::from_env()).unwrap_or_else(|e| {
        log::error!("Failed to build parcel index: {e}");
        std::process::exit(1);
    });
    let stats = index.stats();
    log::info!(
        "Index ready: {} features indexed, {} skipped, {} cells",
        stats.indexed_count,
        stats.skipped_malformed,
        stats.cell_count
    );

    let state = web::Data::new(AppState { index });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route(
                        "/geo/parcel-by-point",
                        web::get().to(handlers::parcel_by_point),
                    )
                    .route("/geo/buffer", web::get().to(handlers::buffer))
                    .route("/geo/search", web::get().to(handlers::search)),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
