//! Boundary validation helpers.
//!
//! Explicit validation functions returning `InvalidArgument`, invoked by
//! the services before any repository call runs.

use rust_decimal::Decimal;

use crate::domain::GeoPoint;
use crate::ports::{PortError, PortResult};

pub(crate) const MAX_PAGE_LIMIT: u32 = 100;

pub(crate) fn point(label: &str, point: &GeoPoint) -> PortResult<()> {
    if !point.is_valid() {
        return Err(PortError::InvalidArgument(format!(
            "{label} ({}, {}) is outside the valid latitude/longitude ranges",
            point.latitude, point.longitude
        )));
    }
    Ok(())
}

pub(crate) fn radius_km(radius_km: f64) -> PortResult<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(PortError::InvalidArgument(format!(
            "search radius must be a positive number of kilometers, got {radius_km}"
        )));
    }
    Ok(())
}

pub(crate) fn pagination(page: u32, limit: u32) -> PortResult<()> {
    if page < 1 {
        return Err(PortError::InvalidArgument(format!(
            "page must be at least 1, got {page}"
        )));
    }
    if limit < 1 || limit > MAX_PAGE_LIMIT {
        return Err(PortError::InvalidArgument(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

pub(crate) fn amount(label: &str, amount: Decimal) -> PortResult<()> {
    if amount < Decimal::ZERO {
        return Err(PortError::InvalidArgument(format!(
            "{label} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
