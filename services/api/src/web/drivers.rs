//! services/api/src/web/drivers.rs
//!
//! Axum handlers for the driver endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::web::rest::DriverResponse;
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct NearbyDriversQuery {
    /// Latitude of the search origin (between -90 and 90).
    pub latitude: f64,
    /// Longitude of the search origin (between -180 and 180).
    pub longitude: f64,
    /// Search radius in kilometers (must be positive).
    pub radius: f64,
}

/// List all drivers.
#[utoipa::path(
    get,
    path = "/drivers",
    responses(
        (status = 200, description = "All registered drivers", body = [DriverResponse])
    )
)]
pub async fn list_drivers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriverResponse>>, ApiError> {
    let drivers = state.drivers.list().await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}

/// List drivers currently available for assignment.
#[utoipa::path(
    get,
    path = "/drivers/available",
    responses(
        (status = 200, description = "Drivers with status 'available'", body = [DriverResponse])
    )
)]
pub async fn list_available_drivers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriverResponse>>, ApiError> {
    let drivers = state.drivers.list_available().await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}

/// List available drivers within a radius of a point, nearest first.
#[utoipa::path(
    get,
    path = "/drivers/nearby",
    params(NearbyDriversQuery),
    responses(
        (status = 200, description = "Available drivers inside the radius", body = [DriverResponse]),
        (status = 400, description = "Invalid coordinates or radius")
    )
)]
pub async fn list_nearby_drivers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyDriversQuery>,
) -> Result<Json<Vec<DriverResponse>>, ApiError> {
    let drivers = state
        .drivers
        .find_nearby(query.latitude, query.longitude, query.radius)
        .await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}
