pub mod drivers;
pub mod invoices;
pub mod passengers;
pub mod rest;
pub mod state;
pub mod trips;

pub use state::AppState;
