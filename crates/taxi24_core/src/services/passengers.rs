//! Passenger directory: existence lookups and creation.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Driver, Passenger};
use crate::ports::{NewPassenger, PassengerRepository, PortError, PortResult};
use crate::services::drivers::DriverDirectory;

#[derive(Clone)]
pub struct PassengerDirectory {
    passengers: Arc<dyn PassengerRepository>,
    drivers: DriverDirectory,
}

impl PassengerDirectory {
    pub fn new(passengers: Arc<dyn PassengerRepository>, drivers: DriverDirectory) -> Self {
        Self {
            passengers,
            drivers,
        }
    }

    pub async fn list(&self) -> PortResult<Vec<Passenger>> {
        self.passengers.find_all().await
    }

    pub async fn get(&self, id: Uuid) -> PortResult<Passenger> {
        self.passengers
            .find_by_id(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("passenger {id} not found")))
    }

    pub async fn register(&self, name: String, phone: Option<String>) -> PortResult<Passenger> {
        self.passengers.create(NewPassenger { name, phone }).await
    }

    /// Available drivers within `radius_km` of a point the passenger is
    /// requesting from. Passengers carry no stored location, so the caller
    /// supplies the coordinates; the passenger id is checked for existence.
    pub async fn nearby_drivers_for(
        &self,
        passenger_id: Uuid,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> PortResult<Vec<Driver>> {
        self.get(passenger_id).await?;
        self.drivers.find_nearby(latitude, longitude, radius_km).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DriverStatus, GeoPoint};
    use crate::services::fakes::{InMemoryDrivers, InMemoryPassengers};
    use chrono::Utc;

    fn setup(passengers: Vec<Passenger>, drivers: Vec<Driver>) -> PassengerDirectory {
        PassengerDirectory::new(
            Arc::new(InMemoryPassengers::with(passengers)),
            DriverDirectory::new(Arc::new(InMemoryDrivers::with(drivers))),
        )
    }

    fn passenger(name: &str) -> Passenger {
        Passenger {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn nearby_drivers_requires_existing_passenger() {
        let directory = setup(vec![], vec![]);
        let err = directory
            .nearby_drivers_for(Uuid::new_v4(), 40.7128, -74.0060, 3.0)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn nearby_drivers_answers_for_known_passenger() {
        let rider = passenger("Ana");
        let cab = Driver {
            id: Uuid::new_v4(),
            name: "Juan".to_string(),
            phone: None,
            location: Some(GeoPoint::new(40.7130, -74.0050)),
            status: DriverStatus::Available,
            created_at: Utc::now(),
        };
        let directory = setup(vec![rider.clone()], vec![cab.clone()]);

        let found = directory
            .nearby_drivers_for(rider.id, 40.7128, -74.0060, 3.0)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, cab.id);
    }

    #[tokio::test]
    async fn register_assigns_id_and_timestamp() {
        let directory = setup(vec![], vec![]);
        let created = directory
            .register("Luis".to_string(), Some("4445556666".to_string()))
            .await
            .unwrap();
        assert_eq!(created.name, "Luis");
        assert_eq!(directory.get(created.id).await.unwrap().id, created.id);
    }
}
