//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the response
//! payload structs shared by the REST handlers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use taxi24_core::domain::{Driver, GeoPoint, Invoice, Passenger, Trip};
use taxi24_core::ports::Page;

use crate::web::{drivers, invoices, passengers, trips};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        drivers::list_drivers_handler,
        drivers::list_available_drivers_handler,
        drivers::list_nearby_drivers_handler,
        passengers::list_passengers_handler,
        passengers::get_passenger_handler,
        passengers::create_passenger_handler,
        passengers::passenger_nearby_drivers_handler,
        trips::list_trips_handler,
        trips::get_trip_handler,
        trips::create_trip_handler,
        trips::complete_trip_handler,
        trips::get_trip_invoice_handler,
        invoices::list_invoices_handler,
        invoices::get_invoice_handler,
        invoices::create_invoice_handler,
    ),
    components(schemas(
        LocationDto,
        DriverResponse,
        PassengerResponse,
        TripResponse,
        InvoiceResponse,
        PageMeta,
        TripListResponse,
        InvoiceListResponse,
        passengers::CreatePassengerRequest,
        trips::CreateTripRequest,
        trips::CompleteTripRequest,
        invoices::CreateInvoiceRequest,
    )),
    tags(
        (name = "Taxi24 API", description = "Drivers, passengers, trips and invoices for the ride-hailing demo backend.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LocationDto {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<LocationDto>,
    #[schema(example = "available")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name,
            phone: driver.phone,
            location: driver.location.map(LocationDto::from),
            status: driver.status.as_str().to_string(),
            created_at: driver.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PassengerResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Passenger> for PassengerResponse {
    fn from(passenger: Passenger) -> Self {
        Self {
            id: passenger.id,
            name: passenger.name,
            phone: passenger.phone,
            created_at: passenger.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TripResponse {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub passenger_id: Option<Uuid>,
    pub start_location: Option<LocationDto>,
    pub end_location: Option<LocationDto>,
    #[schema(example = "active")]
    pub status: String,
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            driver_id: trip.driver_id,
            passenger_id: trip.passenger_id,
            start_location: trip.start_location.map(LocationDto::from),
            end_location: trip.end_location.map(LocationDto::from),
            status: trip.status.as_str().to_string(),
            cost: trip.cost,
            created_at: trip.created_at,
            completed_at: trip.completed_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            trip_id: invoice.trip_id,
            amount: invoice.amount,
            created_at: invoice.created_at,
        }
    }
}

/// Pagination metadata echoed alongside every paged listing.
#[derive(Serialize, ToSchema)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> From<&Page<T>> for PageMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TripListResponse {
    pub items: Vec<TripResponse>,
    pub meta: PageMeta,
}

impl From<Page<Trip>> for TripListResponse {
    fn from(page: Page<Trip>) -> Self {
        let meta = PageMeta::from(&page);
        Self {
            items: page.items.into_iter().map(TripResponse::from).collect(),
            meta,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct InvoiceListResponse {
    pub items: Vec<InvoiceResponse>,
    pub meta: PageMeta,
}

impl From<Page<Invoice>> for InvoiceListResponse {
    fn from(page: Page<Invoice>) -> Self {
        let meta = PageMeta::from(&page);
        Self {
            items: page.items.into_iter().map(InvoiceResponse::from).collect(),
            meta,
        }
    }
}
