//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taxi24_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a database migration failure at startup.
    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Port(PortError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Port(PortError::InvalidState(msg))
            | ApiError::Port(PortError::InvalidArgument(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            _ => {
                error!("internal error: {self:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}
