//! crates/taxi24_core/src/ports.rs
//!
//! Defines the persistence contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete relational store behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Driver, DriverStatus, GeoPoint, Invoice, Passenger, Trip};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the external store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Shared Query Types
//=========================================================================================

/// One page of a listing, with the pagination metadata callers echo back.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = (total as f64 / limit.max(1) as f64).ceil() as u32;
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Filters for the invoice listing, joined through trips for the
/// passenger/driver criteria.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilters {
    pub passenger_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: u32,
    pub limit: u32,
}

//=========================================================================================
// New-Record Inputs
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewPassenger {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub driver_id: Uuid,
    pub passenger_id: Uuid,
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub trip_id: Uuid,
    pub amount: Decimal,
}

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<Driver>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Driver>>;

    async fn find_available(&self) -> PortResult<Vec<Driver>>;

    /// Available drivers with a recorded location within `radius_km`
    /// kilometers of `origin`, nearest first (geodesic distance).
    async fn find_within_radius(&self, origin: GeoPoint, radius_km: f64)
        -> PortResult<Vec<Driver>>;

    /// Atomically flips the driver to `busy` if and only if it is currently
    /// `available`, returning whether this caller won the row. At most one
    /// of any number of concurrent callers succeeds.
    async fn claim_if_available(&self, id: Uuid) -> PortResult<bool>;

    /// Unconditional status write. No transition check; callers are
    /// responsible for correct usage.
    async fn set_status(&self, id: Uuid, status: DriverStatus) -> PortResult<()>;
}

#[async_trait]
pub trait PassengerRepository: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<Passenger>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Passenger>>;

    async fn create(&self, new_passenger: NewPassenger) -> PortResult<Passenger>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Trip>>;

    /// Persists a new trip with status `active`.
    async fn create(&self, new_trip: NewTrip) -> PortResult<Trip>;

    /// Persists the mutable fields of a trip (status, cost, completed_at).
    async fn update(&self, trip: Trip) -> PortResult<Trip>;

    async fn list(&self, page: u32, limit: u32) -> PortResult<Page<Trip>>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn create(&self, new_invoice: NewInvoice) -> PortResult<Invoice>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Invoice>>;

    async fn find_by_trip_id(&self, trip_id: Uuid) -> PortResult<Option<Invoice>>;

    async fn list(&self, filters: InvoiceFilters) -> PortResult<Page<Invoice>>;
}
