//! In-memory repository implementations for unit tests.
//!
//! These mirror the store's contracts closely enough to exercise the
//! services: the driver fake computes real great-circle distances and its
//! claim is atomic under the lock, matching the conditional UPDATE the
//! Postgres adapter issues.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Driver, DriverStatus, GeoPoint, Invoice, Passenger, Trip, TripStatus};
use crate::ports::{
    DriverRepository, InvoiceFilters, InvoiceRepository, NewInvoice, NewPassenger, NewTrip, Page,
    PassengerRepository, PortError, PortResult, TripRepository,
};

const EARTH_RADIUS_KM: f64 = 6371.0;

fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

//=========================================================================================
// Drivers
//=========================================================================================

pub struct InMemoryDrivers {
    drivers: Mutex<HashMap<Uuid, Driver>>,
    radius_queries: AtomicUsize,
    steal_next_claim: AtomicBool,
}

impl InMemoryDrivers {
    pub fn with(drivers: Vec<Driver>) -> Self {
        Self {
            drivers: Mutex::new(drivers.into_iter().map(|d| (d.id, d)).collect()),
            radius_queries: AtomicUsize::new(0),
            steal_next_claim: AtomicBool::new(false),
        }
    }

    pub fn status_of(&self, id: Uuid) -> Option<DriverStatus> {
        self.drivers.lock().unwrap().get(&id).map(|d| d.status)
    }

    /// How many times `find_within_radius` actually ran.
    pub fn radius_queries(&self) -> usize {
        self.radius_queries.load(Ordering::SeqCst)
    }

    /// Makes the next claim behave as if a concurrent caller won the
    /// driver an instant earlier.
    pub fn steal_next_claim(&self) {
        self.steal_next_claim.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DriverRepository for InMemoryDrivers {
    async fn find_all(&self) -> PortResult<Vec<Driver>> {
        Ok(self.drivers.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Driver>> {
        Ok(self.drivers.lock().unwrap().get(&id).cloned())
    }

    async fn find_available(&self) -> PortResult<Vec<Driver>> {
        Ok(self
            .drivers
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.status == DriverStatus::Available)
            .cloned()
            .collect())
    }

    async fn find_within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> PortResult<Vec<Driver>> {
        self.radius_queries.fetch_add(1, Ordering::SeqCst);
        let mut hits: Vec<(f64, Driver)> = self
            .drivers
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.status == DriverStatus::Available)
            .filter_map(|d| {
                let location = d.location?;
                let distance = haversine_km(origin, location);
                (distance <= radius_km).then(|| (distance, d.clone()))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits.into_iter().map(|(_, d)| d).collect())
    }

    async fn claim_if_available(&self, id: Uuid) -> PortResult<bool> {
        let mut drivers = self.drivers.lock().unwrap();
        let Some(driver) = drivers.get_mut(&id) else {
            return Ok(false);
        };
        if self.steal_next_claim.swap(false, Ordering::SeqCst) {
            driver.status = DriverStatus::Busy;
            return Ok(false);
        }
        if driver.status != DriverStatus::Available {
            return Ok(false);
        }
        driver.status = DriverStatus::Busy;
        Ok(true)
    }

    async fn set_status(&self, id: Uuid, status: DriverStatus) -> PortResult<()> {
        if let Some(driver) = self.drivers.lock().unwrap().get_mut(&id) {
            driver.status = status;
        }
        Ok(())
    }
}

//=========================================================================================
// Passengers
//=========================================================================================

pub struct InMemoryPassengers {
    passengers: Mutex<HashMap<Uuid, Passenger>>,
}

impl InMemoryPassengers {
    pub fn with(passengers: Vec<Passenger>) -> Self {
        Self {
            passengers: Mutex::new(passengers.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl PassengerRepository for InMemoryPassengers {
    async fn find_all(&self) -> PortResult<Vec<Passenger>> {
        Ok(self.passengers.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Passenger>> {
        Ok(self.passengers.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, new_passenger: NewPassenger) -> PortResult<Passenger> {
        let passenger = Passenger {
            id: Uuid::new_v4(),
            name: new_passenger.name,
            phone: new_passenger.phone,
            created_at: Utc::now(),
        };
        self.passengers
            .lock()
            .unwrap()
            .insert(passenger.id, passenger.clone());
        Ok(passenger)
    }
}

//=========================================================================================
// Trips
//=========================================================================================

pub struct InMemoryTrips {
    trips: Mutex<Vec<Trip>>,
    fail_next_create: AtomicBool,
}

impl InMemoryTrips {
    pub fn new() -> Self {
        Self {
            trips: Mutex::new(Vec::new()),
            fail_next_create: AtomicBool::new(false),
        }
    }

    pub fn count(&self) -> usize {
        self.trips.lock().unwrap().len()
    }

    /// Makes the next insert fail, simulating a store error after the
    /// driver claim already succeeded.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Inserts a trip directly, bypassing the lifecycle.
    pub async fn seed(&self, new_trip: NewTrip) -> Trip {
        self.create(new_trip).await.unwrap()
    }
}

#[async_trait]
impl TripRepository for InMemoryTrips {
    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Trip>> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn create(&self, new_trip: NewTrip) -> PortResult<Trip> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(PortError::Unexpected("insert failed".to_string()));
        }
        let trip = Trip {
            id: Uuid::new_v4(),
            driver_id: Some(new_trip.driver_id),
            passenger_id: Some(new_trip.passenger_id),
            start_location: Some(new_trip.start_location),
            end_location: Some(new_trip.end_location),
            status: TripStatus::Active,
            cost: new_trip.cost,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.trips.lock().unwrap().push(trip.clone());
        Ok(trip)
    }

    async fn update(&self, trip: Trip) -> PortResult<Trip> {
        let mut trips = self.trips.lock().unwrap();
        let stored = trips
            .iter_mut()
            .find(|t| t.id == trip.id)
            .ok_or_else(|| PortError::NotFound(format!("trip {} not found", trip.id)))?;
        *stored = trip.clone();
        Ok(trip)
    }

    async fn list(&self, page: u32, limit: u32) -> PortResult<Page<Trip>> {
        let trips = self.trips.lock().unwrap();
        let total = trips.len() as u64;
        let offset = ((page - 1) * limit) as usize;
        let items = trips
            .iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page, limit))
    }
}

//=========================================================================================
// Invoices
//=========================================================================================

pub struct InMemoryInvoices {
    invoices: Mutex<Vec<Invoice>>,
}

impl InMemoryInvoices {
    pub fn new() -> Self {
        Self {
            invoices: Mutex::new(Vec::new()),
        }
    }

    pub fn for_trip(&self, trip_id: Uuid) -> Vec<Invoice> {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.trip_id == trip_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoices {
    async fn create(&self, new_invoice: NewInvoice) -> PortResult<Invoice> {
        let invoice = Invoice {
            id: Uuid::new_v4(),
            trip_id: new_invoice.trip_id,
            amount: new_invoice.amount,
            created_at: Utc::now(),
        };
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(invoice)
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn find_by_trip_id(&self, trip_id: Uuid) -> PortResult<Option<Invoice>> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.trip_id == trip_id)
            .cloned())
    }

    async fn list(&self, filters: InvoiceFilters) -> PortResult<Page<Invoice>> {
        // The passenger/driver criteria need the trips join and are the
        // store adapter's concern; the fake filters by date only.
        let invoices = self.invoices.lock().unwrap();
        let matching: Vec<Invoice> = invoices
            .iter()
            .filter(|i| filters.start_date.map_or(true, |d| i.created_at >= d))
            .filter(|i| filters.end_date.map_or(true, |d| i.created_at <= d))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let offset = ((filters.page - 1) * filters.limit) as usize;
        let items = matching
            .into_iter()
            .skip(offset)
            .take(filters.limit as usize)
            .collect();
        Ok(Page::new(items, total, filters.page, filters.limit))
    }
}
