//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the repository ports from the `taxi24_core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`, with PostGIS providing the geodesic
//! distance predicate behind the proximity queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use taxi24_core::domain::{Driver, DriverStatus, GeoPoint, Invoice, Passenger, Trip, TripStatus};
use taxi24_core::ports::{
    DriverRepository, InvoiceFilters, InvoiceRepository, NewInvoice, NewPassenger, NewTrip, Page,
    PassengerRepository, PortError, PortResult, TripRepository,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements all four repository ports over one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DriverRecord {
    id: Uuid,
    name: String,
    phone: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: String,
    created_at: DateTime<Utc>,
}

impl DriverRecord {
    fn to_domain(self) -> PortResult<Driver> {
        let status = DriverStatus::parse(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("unknown driver status '{}' in store", self.status))
        })?;
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };
        Ok(Driver {
            id: self.id,
            name: self.name,
            phone: self.phone,
            location,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct PassengerRecord {
    id: Uuid,
    name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl PassengerRecord {
    fn to_domain(self) -> Passenger {
        Passenger {
            id: self.id,
            name: self.name,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct TripRecord {
    id: Uuid,
    driver_id: Option<Uuid>,
    passenger_id: Option<Uuid>,
    start_latitude: Option<f64>,
    start_longitude: Option<f64>,
    end_latitude: Option<f64>,
    end_longitude: Option<f64>,
    status: String,
    cost: Option<Decimal>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TripRecord {
    fn to_domain(self) -> PortResult<Trip> {
        let status = TripStatus::parse(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("unknown trip status '{}' in store", self.status))
        })?;
        let point = |lat: Option<f64>, lng: Option<f64>| match (lat, lng) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };
        Ok(Trip {
            id: self.id,
            driver_id: self.driver_id,
            passenger_id: self.passenger_id,
            start_location: point(self.start_latitude, self.start_longitude),
            end_location: point(self.end_latitude, self.end_longitude),
            status,
            cost: self.cost,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(FromRow)]
struct InvoiceRecord {
    id: Uuid,
    trip_id: Uuid,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

impl InvoiceRecord {
    fn to_domain(self) -> Invoice {
        Invoice {
            id: self.id,
            trip_id: self.trip_id,
            amount: self.amount,
            created_at: self.created_at,
        }
    }
}

const DRIVER_COLUMNS: &str = "id, name, phone, \
     ST_Y(location) AS latitude, ST_X(location) AS longitude, \
     status, created_at";

const TRIP_COLUMNS: &str = "id, driver_id, passenger_id, \
     ST_Y(start_location) AS start_latitude, ST_X(start_location) AS start_longitude, \
     ST_Y(end_location) AS end_latitude, ST_X(end_location) AS end_longitude, \
     status, cost, created_at, completed_at";

//=========================================================================================
// `DriverRepository` Implementation
//=========================================================================================

#[async_trait]
impl DriverRepository for PgStore {
    async fn find_all(&self) -> PortResult<Vec<Driver>> {
        let records: Vec<DriverRecord> =
            sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers"))
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;
        records.into_iter().map(DriverRecord::to_domain).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Driver>> {
        let record: Option<DriverRecord> =
            sqlx::query_as(&format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        record.map(DriverRecord::to_domain).transpose()
    }

    async fn find_available(&self) -> PortResult<Vec<Driver>> {
        let records: Vec<DriverRecord> = sqlx::query_as(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE status = 'available'"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(DriverRecord::to_domain).collect()
    }

    async fn find_within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> PortResult<Vec<Driver>> {
        // geography casts make ST_DWithin/ST_Distance geodesic (meters).
        let records: Vec<DriverRecord> = sqlx::query_as(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers \
             WHERE status = 'available' \
               AND location IS NOT NULL \
               AND ST_DWithin(location::geography, \
                              ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3) \
             ORDER BY ST_Distance(location::geography, \
                                  ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography)"
        ))
        .bind(origin.longitude)
        .bind(origin.latitude)
        .bind(radius_km * 1000.0)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(DriverRecord::to_domain).collect()
    }

    async fn claim_if_available(&self, id: Uuid) -> PortResult<bool> {
        // Conditional update: of any number of concurrent callers, at most
        // one sees the row while it is still 'available'.
        let result =
            sqlx::query("UPDATE drivers SET status = 'busy' WHERE id = $1 AND status = 'available'")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_status(&self, id: Uuid, status: DriverStatus) -> PortResult<()> {
        sqlx::query("UPDATE drivers SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `PassengerRepository` Implementation
//=========================================================================================

#[async_trait]
impl PassengerRepository for PgStore {
    async fn find_all(&self) -> PortResult<Vec<Passenger>> {
        let records: Vec<PassengerRecord> =
            sqlx::query_as("SELECT id, name, phone, created_at FROM passengers")
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(records.into_iter().map(PassengerRecord::to_domain).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Passenger>> {
        let record: Option<PassengerRecord> =
            sqlx::query_as("SELECT id, name, phone, created_at FROM passengers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(record.map(PassengerRecord::to_domain))
    }

    async fn create(&self, new_passenger: NewPassenger) -> PortResult<Passenger> {
        let record: PassengerRecord = sqlx::query_as(
            "INSERT INTO passengers (id, name, phone) VALUES ($1, $2, $3) \
             RETURNING id, name, phone, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_passenger.name)
        .bind(new_passenger.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `TripRepository` Implementation
//=========================================================================================

#[async_trait]
impl TripRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Trip>> {
        let record: Option<TripRecord> =
            sqlx::query_as(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        record.map(TripRecord::to_domain).transpose()
    }

    async fn create(&self, new_trip: NewTrip) -> PortResult<Trip> {
        let record: TripRecord = sqlx::query_as(&format!(
            "INSERT INTO trips (id, driver_id, passenger_id, start_location, end_location, status, cost) \
             VALUES ($1, $2, $3, \
                     ST_SetSRID(ST_MakePoint($4, $5), 4326), \
                     ST_SetSRID(ST_MakePoint($6, $7), 4326), \
                     'active', $8) \
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new_trip.driver_id)
        .bind(new_trip.passenger_id)
        .bind(new_trip.start_location.longitude)
        .bind(new_trip.start_location.latitude)
        .bind(new_trip.end_location.longitude)
        .bind(new_trip.end_location.latitude)
        .bind(new_trip.cost)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update(&self, trip: Trip) -> PortResult<Trip> {
        let record: TripRecord = sqlx::query_as(&format!(
            "UPDATE trips SET status = $2, cost = $3, completed_at = $4 \
             WHERE id = $1 \
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(trip.id)
        .bind(trip.status.as_str())
        .bind(trip.cost)
        .bind(trip.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("trip {} not found", trip.id)),
            other => unexpected(other),
        })?;
        record.to_domain()
    }

    async fn list(&self, page: u32, limit: u32) -> PortResult<Page<Trip>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        let offset = (page as i64 - 1) * limit as i64;
        let records: Vec<TripRecord> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        let items = records
            .into_iter()
            .map(TripRecord::to_domain)
            .collect::<PortResult<Vec<Trip>>>()?;
        Ok(Page::new(items, total as u64, page, limit))
    }
}

//=========================================================================================
// `InvoiceRepository` Implementation
//=========================================================================================

/// Appends the WHERE clause shared by the invoice listing and its count.
fn push_invoice_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &InvoiceFilters) {
    builder.push(" WHERE true");
    if let Some(passenger_id) = filters.passenger_id {
        builder.push(" AND trips.passenger_id = ").push_bind(passenger_id);
    }
    if let Some(driver_id) = filters.driver_id {
        builder.push(" AND trips.driver_id = ").push_bind(driver_id);
    }
    if let Some(start_date) = filters.start_date {
        builder.push(" AND invoices.created_at >= ").push_bind(start_date);
    }
    if let Some(end_date) = filters.end_date {
        builder.push(" AND invoices.created_at <= ").push_bind(end_date);
    }
}

#[async_trait]
impl InvoiceRepository for PgStore {
    async fn create(&self, new_invoice: NewInvoice) -> PortResult<Invoice> {
        let record: InvoiceRecord = sqlx::query_as(
            "INSERT INTO invoices (id, trip_id, amount) VALUES ($1, $2, $3) \
             RETURNING id, trip_id, amount, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_invoice.trip_id)
        .bind(new_invoice.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<Invoice>> {
        let record: Option<InvoiceRecord> =
            sqlx::query_as("SELECT id, trip_id, amount, created_at FROM invoices WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(record.map(InvoiceRecord::to_domain))
    }

    async fn find_by_trip_id(&self, trip_id: Uuid) -> PortResult<Option<Invoice>> {
        let record: Option<InvoiceRecord> = sqlx::query_as(
            "SELECT id, trip_id, amount, created_at FROM invoices WHERE trip_id = $1",
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(InvoiceRecord::to_domain))
    }

    async fn list(&self, filters: InvoiceFilters) -> PortResult<Page<Invoice>> {
        let mut count_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM invoices JOIN trips ON trips.id = invoices.trip_id",
        );
        push_invoice_filters(&mut count_builder, &filters);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT invoices.id, invoices.trip_id, invoices.amount, invoices.created_at \
             FROM invoices JOIN trips ON trips.id = invoices.trip_id",
        );
        push_invoice_filters(&mut builder, &filters);
        builder
            .push(" ORDER BY invoices.created_at DESC LIMIT ")
            .push_bind(filters.limit as i64)
            .push(" OFFSET ")
            .push_bind((filters.page as i64 - 1) * filters.limit as i64);
        let records: Vec<InvoiceRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let items = records.into_iter().map(InvoiceRecord::to_domain).collect();
        Ok(Page::new(items, total as u64, filters.page, filters.limit))
    }
}
