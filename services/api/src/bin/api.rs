//! services/api/src/bin/api.rs

use api_lib::{
    adapters::PgStore,
    config::Config,
    error::ApiError,
    web::{drivers, invoices, passengers, rest::ApiDoc, state::AppState, trips},
};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::{get, patch},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use taxi24_core::ports::{
    DriverRepository, InvoiceRepository, PassengerRepository, TripRepository,
};
use taxi24_core::services::{
    DriverDirectory, InvoiceIssuer, PassengerDirectory, TripLifecycle,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Wire the Core Services ---
    let driver_directory = DriverDirectory::new(store.clone() as Arc<dyn DriverRepository>);
    let passenger_directory = PassengerDirectory::new(
        store.clone() as Arc<dyn PassengerRepository>,
        driver_directory.clone(),
    );
    let trip_lifecycle = TripLifecycle::new(
        store.clone() as Arc<dyn TripRepository>,
        store.clone() as Arc<dyn PassengerRepository>,
        store.clone() as Arc<dyn InvoiceRepository>,
        driver_directory.clone(),
    );
    let invoice_issuer = InvoiceIssuer::new(
        store.clone() as Arc<dyn InvoiceRepository>,
        store.clone() as Arc<dyn TripRepository>,
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        drivers: driver_directory,
        passengers: passenger_directory,
        trips: trip_lifecycle,
        invoices: invoice_issuer,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/drivers", get(drivers::list_drivers_handler))
        .route("/drivers/available", get(drivers::list_available_drivers_handler))
        .route("/drivers/nearby", get(drivers::list_nearby_drivers_handler))
        .route(
            "/passengers",
            get(passengers::list_passengers_handler).post(passengers::create_passenger_handler),
        )
        .route("/passengers/{id}", get(passengers::get_passenger_handler))
        .route(
            "/passengers/{id}/nearby-drivers",
            get(passengers::passenger_nearby_drivers_handler),
        )
        .route(
            "/trips",
            get(trips::list_trips_handler).post(trips::create_trip_handler),
        )
        .route("/trips/{id}", get(trips::get_trip_handler))
        .route("/trips/{id}/complete", patch(trips::complete_trip_handler))
        .route("/trips/{id}/invoice", get(trips::get_trip_invoice_handler))
        .route(
            "/invoices",
            get(invoices::list_invoices_handler).post(invoices::create_invoice_handler),
        )
        .route("/invoices/{id}", get(invoices::get_invoice_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
