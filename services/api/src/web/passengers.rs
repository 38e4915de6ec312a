//! services/api/src/web/passengers.rs
//!
//! Axum handlers for the passenger endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::drivers::NearbyDriversQuery;
use crate::web::rest::{DriverResponse, PassengerResponse};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct CreatePassengerRequest {
    #[schema(example = "Ana Martinez")]
    pub name: String,
    #[schema(example = "1112223333")]
    pub phone: Option<String>,
}

/// List all passengers.
#[utoipa::path(
    get,
    path = "/passengers",
    responses(
        (status = 200, description = "All registered passengers", body = [PassengerResponse])
    )
)]
pub async fn list_passengers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PassengerResponse>>, ApiError> {
    let passengers = state.passengers.list().await?;
    Ok(Json(
        passengers.into_iter().map(PassengerResponse::from).collect(),
    ))
}

/// Get a passenger by id.
#[utoipa::path(
    get,
    path = "/passengers/{id}",
    params(("id" = Uuid, Path, description = "Passenger id")),
    responses(
        (status = 200, description = "The passenger", body = PassengerResponse),
        (status = 404, description = "Passenger not found")
    )
)]
pub async fn get_passenger_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PassengerResponse>, ApiError> {
    let passenger = state.passengers.get(id).await?;
    Ok(Json(PassengerResponse::from(passenger)))
}

/// Register a new passenger.
#[utoipa::path(
    post,
    path = "/passengers",
    request_body = CreatePassengerRequest,
    responses(
        (status = 201, description = "Passenger created", body = PassengerResponse)
    )
)]
pub async fn create_passenger_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePassengerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let passenger = state
        .passengers
        .register(request.name, request.phone)
        .await?;
    Ok((StatusCode::CREATED, Json(PassengerResponse::from(passenger))))
}

/// List available drivers near a point, on behalf of a passenger.
#[utoipa::path(
    get,
    path = "/passengers/{id}/nearby-drivers",
    params(
        ("id" = Uuid, Path, description = "Passenger id"),
        NearbyDriversQuery
    ),
    responses(
        (status = 200, description = "Available drivers inside the radius", body = [DriverResponse]),
        (status = 400, description = "Invalid coordinates or radius"),
        (status = 404, description = "Passenger not found")
    )
)]
pub async fn passenger_nearby_drivers_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<NearbyDriversQuery>,
) -> Result<Json<Vec<DriverResponse>>, ApiError> {
    let drivers = state
        .passengers
        .nearby_drivers_for(id, query.latitude, query.longitude, query.radius)
        .await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}
