//! services/api/src/web/invoices.rs
//!
//! Axum handlers for the invoice endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use taxi24_core::ports::InvoiceFilters;

use crate::error::ApiError;
use crate::web::rest::{InvoiceListResponse, InvoiceResponse};
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct InvoiceListQuery {
    /// Only invoices whose trip belongs to this passenger.
    pub passenger_id: Option<Uuid>,
    /// Only invoices whose trip was served by this driver.
    pub driver_id: Option<Uuid>,
    /// Only invoices created at or after this instant (RFC 3339).
    pub start_date: Option<DateTime<Utc>>,
    /// Only invoices created at or before this instant (RFC 3339).
    pub end_date: Option<DateTime<Utc>>,
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Records per page, at most 100.
    pub limit: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440004")]
    pub trip_id: Uuid,
    #[schema(example = 15.5)]
    pub amount: Decimal,
}

/// List invoices with optional passenger/driver/date filters.
#[utoipa::path(
    get,
    path = "/invoices",
    params(InvoiceListQuery),
    responses(
        (status = 200, description = "One page of invoices", body = InvoiceListResponse),
        (status = 400, description = "Invalid pagination parameters")
    )
)]
pub async fn list_invoices_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<InvoiceListResponse>, ApiError> {
    let page = state
        .invoices
        .list(InvoiceFilters {
            passenger_id: query.passenger_id,
            driver_id: query.driver_id,
            start_date: query.start_date,
            end_date: query.end_date,
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(100),
        })
        .await?;
    Ok(Json(InvoiceListResponse::from(page)))
}

/// Get an invoice by id.
#[utoipa::path(
    get,
    path = "/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "The invoice", body = InvoiceResponse),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn get_invoice_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.invoices.get(id).await?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

/// Record an invoice directly (administrative path). The trip must exist;
/// completion normally issues the invoice itself.
#[utoipa::path(
    post,
    path = "/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice recorded", body = InvoiceResponse),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn create_invoice_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = state.invoices.issue(request.trip_id, request.amount).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}
