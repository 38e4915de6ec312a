pub mod domain;
pub mod ports;
pub mod services;

pub use domain::{Driver, DriverStatus, GeoPoint, Invoice, Passenger, Trip, TripStatus};
pub use ports::{
    DriverRepository, InvoiceFilters, InvoiceRepository, NewInvoice, NewPassenger, NewTrip, Page,
    PassengerRepository, PortError, PortResult, TripRepository,
};
pub use services::{DriverDirectory, InvoiceIssuer, PassengerDirectory, TripLifecycle, TripRequest};
