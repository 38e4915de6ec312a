//! crates/taxi24_core/src/services/mod.rs
//!
//! The use-case layer: plain structs holding `Arc<dyn Repository>`
//! collaborators, constructed explicitly at startup. All business rules
//! (driver matching, trip lifecycle, invoicing, input validation) live
//! here; the repositories stay free of policy.

pub mod drivers;
pub mod invoices;
pub mod passengers;
pub mod trips;

pub(crate) mod validate;

#[cfg(test)]
pub(crate) mod fakes;

pub use drivers::DriverDirectory;
pub use invoices::InvoiceIssuer;
pub use passengers::PassengerDirectory;
pub use trips::{TripLifecycle, TripRequest};
