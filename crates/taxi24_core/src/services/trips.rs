//! Trip lifecycle: the only component with cross-entity business rules.
//!
//! Trip state machine: Active -> Completed, nothing else. Driver states
//! move in lockstep: a creation claims the driver (available -> busy) and a
//! completion releases it (busy -> available). The claim is an atomic
//! conditional update so two concurrent creations can never bind the same
//! driver to two active trips.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{DriverStatus, GeoPoint, Trip, TripStatus};
use crate::ports::{
    InvoiceRepository, NewInvoice, NewTrip, Page, PassengerRepository, PortError, PortResult,
    TripRepository,
};
use crate::services::drivers::DriverDirectory;
use crate::services::validate;

/// Radius used when resolving a driver automatically from the start point.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 3.0;

/// Everything needed to request a trip. `driver_id` omitted means "assign
/// the closest available driver". `cost` at creation is an estimate; the
/// final cost is always the one supplied at completion.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub passenger_id: Uuid,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub driver_id: Option<Uuid>,
    pub cost: Option<Decimal>,
}

#[derive(Clone)]
pub struct TripLifecycle {
    trips: Arc<dyn TripRepository>,
    passengers: Arc<dyn PassengerRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    drivers: DriverDirectory,
}

impl TripLifecycle {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        passengers: Arc<dyn PassengerRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        drivers: DriverDirectory,
    ) -> Self {
        Self {
            trips,
            passengers,
            invoices,
            drivers,
        }
    }

    pub async fn get(&self, id: Uuid) -> PortResult<Trip> {
        self.trips
            .find_by_id(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("trip {id} not found")))
    }

    pub async fn list(&self, page: u32, limit: u32) -> PortResult<Page<Trip>> {
        validate::pagination(page, limit)?;
        self.trips.list(page, limit).await
    }

    /// Creates a trip: validates the passenger, resolves and claims a
    /// driver, then persists the trip as active. All validation runs
    /// before any mutation, so a rejected request leaves no side effects.
    pub async fn create(&self, request: TripRequest) -> PortResult<Trip> {
        validate::point("start location", &request.start)?;
        validate::point("end location", &request.end)?;
        if let Some(cost) = request.cost {
            validate::amount("trip cost", cost)?;
        }

        self.passengers
            .find_by_id(request.passenger_id)
            .await?
            .ok_or_else(|| {
                PortError::NotFound(format!("passenger {} not found", request.passenger_id))
            })?;

        let driver_id = match request.driver_id {
            Some(id) => self.claim_requested_driver(id).await?,
            None => self.claim_closest_driver(request.start).await?,
        };

        let new_trip = NewTrip {
            driver_id,
            passenger_id: request.passenger_id,
            start_location: request.start,
            end_location: request.end,
            cost: request.cost,
        };
        match self.trips.create(new_trip).await {
            Ok(trip) => Ok(trip),
            Err(err) => {
                // The claim already went through; without the release the
                // driver would stay busy with no owning trip.
                let _ = self
                    .drivers
                    .set_status(driver_id, DriverStatus::Available)
                    .await;
                Err(err)
            }
        }
    }

    /// Completes an active trip: records the final cost and timestamp,
    /// releases the driver, and issues exactly one invoice. A repeated
    /// completion fails the active-check before anything mutates.
    pub async fn complete(&self, trip_id: Uuid, cost: Decimal) -> PortResult<Trip> {
        validate::amount("trip cost", cost)?;

        let mut trip = self.get(trip_id).await?;
        if trip.status != TripStatus::Active {
            return Err(PortError::InvalidState(format!(
                "trip {trip_id} is not active (current status: {})",
                trip.status
            )));
        }

        trip.status = TripStatus::Completed;
        trip.cost = Some(cost);
        trip.completed_at = Some(Utc::now());

        if let Some(driver_id) = trip.driver_id {
            self.drivers
                .set_status(driver_id, DriverStatus::Available)
                .await?;
        }

        let trip = self.trips.update(trip).await?;
        self.invoices
            .create(NewInvoice {
                trip_id,
                amount: cost,
            })
            .await?;
        Ok(trip)
    }

    /// Explicit assignment: the driver must exist and be available. The
    /// read supplies the diagnostic status; the claim itself stays
    /// conditional, so losing a race surfaces as `InvalidState` too.
    async fn claim_requested_driver(&self, id: Uuid) -> PortResult<Uuid> {
        let driver = self.drivers.get(id).await?;
        if driver.status != DriverStatus::Available {
            return Err(PortError::InvalidState(format!(
                "driver {id} is not available (current status: {})",
                driver.status
            )));
        }
        if !self.drivers.claim(id).await? {
            return Err(PortError::InvalidState(format!(
                "driver {id} was claimed by a concurrent trip"
            )));
        }
        Ok(id)
    }

    /// Automatic assignment: candidates come back nearest first; claims
    /// are attempted in order until one wins.
    async fn claim_closest_driver(&self, start: GeoPoint) -> PortResult<Uuid> {
        let candidates = self
            .drivers
            .find_nearby(start.latitude, start.longitude, DEFAULT_SEARCH_RADIUS_KM)
            .await?;
        if candidates.is_empty() {
            return Err(PortError::InvalidState(
                "no available drivers found near the start location".to_string(),
            ));
        }
        for candidate in &candidates {
            if self.drivers.claim(candidate.id).await? {
                return Ok(candidate.id);
            }
        }
        Err(PortError::InvalidState(
            "no available drivers found near the start location".to_string(),
        ))
    }
}
