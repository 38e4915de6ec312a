//! Driver directory: availability and proximity questions, plus the status
//! writes requested by the trip lifecycle.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Driver, DriverStatus, GeoPoint};
use crate::ports::{DriverRepository, PortError, PortResult};
use crate::services::validate;

#[derive(Clone)]
pub struct DriverDirectory {
    drivers: Arc<dyn DriverRepository>,
}

impl DriverDirectory {
    pub fn new(drivers: Arc<dyn DriverRepository>) -> Self {
        Self { drivers }
    }

    pub async fn list(&self) -> PortResult<Vec<Driver>> {
        self.drivers.find_all().await
    }

    pub async fn list_available(&self) -> PortResult<Vec<Driver>> {
        self.drivers.find_available().await
    }

    pub async fn get(&self, id: Uuid) -> PortResult<Driver> {
        self.drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("driver {id} not found")))
    }

    /// Available drivers within `radius_km` kilometers of the given point,
    /// nearest first. Drivers without a recorded location never match.
    ///
    /// The degenerate origin (0, 0) means "no location" in upstream data,
    /// so it short-circuits to an empty list without querying the store.
    pub async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> PortResult<Vec<Driver>> {
        let origin = GeoPoint::new(latitude, longitude);
        validate::point("search origin", &origin)?;
        validate::radius_km(radius_km)?;
        if origin.is_null_island() {
            return Ok(Vec::new());
        }
        self.drivers.find_within_radius(origin, radius_km).await
    }

    /// Atomically claims the driver for a trip. Returns false when another
    /// caller won the driver first (or it was never available).
    pub async fn claim(&self, id: Uuid) -> PortResult<bool> {
        self.drivers.claim_if_available(id).await
    }

    /// Unconditional status write; no transition is rejected here. The trip
    /// lifecycle is the only caller that should flip trip-related states.
    pub async fn set_status(&self, id: Uuid, status: DriverStatus) -> PortResult<()> {
        self.drivers.set_status(id, status).await
    }
}
