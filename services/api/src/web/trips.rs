//! services/api/src/web/trips.rs
//!
//! Axum handlers for the trip endpoints: listing, creation (with explicit
//! or automatic driver assignment) and completion.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use taxi24_core::domain::GeoPoint;
use taxi24_core::services::TripRequest;

use crate::error::ApiError;
use crate::web::rest::{InvoiceResponse, TripListResponse, TripResponse};
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Records per page, at most 100.
    pub limit: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTripRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440003")]
    pub passenger_id: Uuid,
    /// Omit to assign the closest available driver automatically.
    pub driver_id: Option<Uuid>,
    #[schema(example = 40.7128)]
    pub start_latitude: f64,
    #[schema(example = -74.006)]
    pub start_longitude: f64,
    #[schema(example = 40.73)]
    pub end_latitude: f64,
    #[schema(example = -74.0)]
    pub end_longitude: f64,
    /// Optional cost estimate; the final cost is set at completion.
    #[schema(example = 15.5)]
    pub cost: Option<Decimal>,
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteTripRequest {
    #[schema(example = 25.0)]
    pub cost: Decimal,
}

/// List trips, newest first.
#[utoipa::path(
    get,
    path = "/trips",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of trips", body = TripListResponse),
        (status = 400, description = "Invalid pagination parameters")
    )
)]
pub async fn list_trips_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TripListResponse>, ApiError> {
    let page = state
        .trips
        .list(query.page.unwrap_or(1), query.limit.unwrap_or(100))
        .await?;
    Ok(Json(TripListResponse::from(page)))
}

/// Get a trip by id.
#[utoipa::path(
    get,
    path = "/trips/{id}",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "The trip", body = TripResponse),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn get_trip_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, ApiError> {
    let trip = state.trips.get(id).await?;
    Ok(Json(TripResponse::from(trip)))
}

/// Create a trip. The assigned driver becomes busy; the trip starts active.
#[utoipa::path(
    post,
    path = "/trips",
    request_body = CreateTripRequest,
    responses(
        (status = 201, description = "Trip created", body = TripResponse),
        (status = 400, description = "Driver unavailable, no nearby driver, or invalid coordinates"),
        (status = 404, description = "Passenger or driver not found")
    )
)]
pub async fn create_trip_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trip = state
        .trips
        .create(TripRequest {
            passenger_id: request.passenger_id,
            start: GeoPoint::new(request.start_latitude, request.start_longitude),
            end: GeoPoint::new(request.end_latitude, request.end_longitude),
            driver_id: request.driver_id,
            cost: request.cost,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(TripResponse::from(trip))))
}

/// Complete an active trip: final cost, driver release, invoice.
#[utoipa::path(
    patch,
    path = "/trips/{id}/complete",
    params(("id" = Uuid, Path, description = "Trip id")),
    request_body = CompleteTripRequest,
    responses(
        (status = 200, description = "Trip completed", body = TripResponse),
        (status = 400, description = "Trip is not active"),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn complete_trip_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteTripRequest>,
) -> Result<Json<TripResponse>, ApiError> {
    let trip = state.trips.complete(id, request.cost).await?;
    Ok(Json(TripResponse::from(trip)))
}

/// Get the invoice recorded for a trip.
#[utoipa::path(
    get,
    path = "/trips/{id}/invoice",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "The trip's invoice", body = InvoiceResponse),
        (status = 404, description = "No invoice for this trip")
    )
)]
pub async fn get_trip_invoice_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.invoices.for_trip(id).await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}
