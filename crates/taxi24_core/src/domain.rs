//! crates/taxi24_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format;
//! the API layer maps them into its own payload structs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates lie inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// The (0, 0) point, treated as "no location" rather than a real
    /// position off the coast of West Africa. Unset coordinates in
    /// upstream data default to this value.
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Availability state of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Available,
    Busy,
    Offline,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Available => "available",
            DriverStatus::Busy => "busy",
            DriverStatus::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(DriverStatus::Available),
            "busy" => Some(DriverStatus::Busy),
            "offline" => Some(DriverStatus::Offline),
            _ => None,
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a vehicle operator.
#[derive(Debug, Clone)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<GeoPoint>,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
}

/// Represents a rider.
#[derive(Debug, Clone)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a trip. `Canceled` exists in the stored data but no
/// operation here produces it; the only transition is Active -> Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripStatus {
    Active,
    Completed,
    Canceled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Active => "active",
            TripStatus::Completed => "completed",
            TripStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TripStatus::Active),
            "completed" => Some(TripStatus::Completed),
            "canceled" => Some(TripStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one ride from request to completion.
///
/// `driver_id` and `passenger_id` are nullable in the store because the
/// foreign keys are SET NULL on delete; a successfully created trip always
/// starts with both populated.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub passenger_id: Option<Uuid>,
    pub start_location: Option<GeoPoint>,
    pub end_location: Option<GeoPoint>,
    pub status: TripStatus,
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A billing record attached to exactly one trip.
#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The status enums cross into the store as lowercase strings; these
    // are the only string forms `parse` accepts back.
    #[test]
    fn driver_status_string_form_matches_the_stored_values() {
        for status in [
            DriverStatus::Available,
            DriverStatus::Busy,
            DriverStatus::Offline,
        ] {
            assert_eq!(DriverStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DriverStatus::parse("Available"), None);
        assert_eq!(DriverStatus::parse(""), None);
    }

    #[test]
    fn trip_status_string_form_matches_the_stored_values() {
        for status in [
            TripStatus::Active,
            TripStatus::Completed,
            TripStatus::Canceled,
        ] {
            assert_eq!(TripStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TripStatus::parse("cancelled"), None);
    }
}
