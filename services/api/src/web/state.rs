//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use taxi24_core::services::{DriverDirectory, InvoiceIssuer, PassengerDirectory, TripLifecycle};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. The services carry their repository collaborators internally.
#[derive(Clone)]
pub struct AppState {
    pub drivers: DriverDirectory,
    pub passengers: PassengerDirectory,
    pub trips: TripLifecycle,
    pub invoices: InvoiceIssuer,
    pub config: Arc<Config>,
}
