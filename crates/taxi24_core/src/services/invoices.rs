//! Invoice issuer: append-only billing records keyed by trip.

use std::sync::Arc;
use uuid::Uuid;

use rust_decimal::Decimal;

use crate::domain::Invoice;
use crate::ports::{
    InvoiceFilters, InvoiceRepository, NewInvoice, Page, PortError, PortResult, TripRepository,
};
use crate::services::validate;

#[derive(Clone)]
pub struct InvoiceIssuer {
    invoices: Arc<dyn InvoiceRepository>,
    trips: Arc<dyn TripRepository>,
}

impl InvoiceIssuer {
    pub fn new(invoices: Arc<dyn InvoiceRepository>, trips: Arc<dyn TripRepository>) -> Self {
        Self { invoices, trips }
    }

    /// Administrative create path; the trip must exist. The lifecycle's
    /// completion flow writes its invoice through the repository directly.
    pub async fn issue(&self, trip_id: Uuid, amount: Decimal) -> PortResult<Invoice> {
        validate::amount("invoice amount", amount)?;
        self.trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("trip {trip_id} not found")))?;
        self.invoices.create(NewInvoice { trip_id, amount }).await
    }

    pub async fn get(&self, id: Uuid) -> PortResult<Invoice> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("invoice {id} not found")))
    }

    pub async fn for_trip(&self, trip_id: Uuid) -> PortResult<Invoice> {
        self.invoices
            .find_by_trip_id(trip_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("no invoice found for trip {trip_id}")))
    }

    pub async fn list(&self, filters: InvoiceFilters) -> PortResult<Page<Invoice>> {
        validate::pagination(filters.page, filters.limit)?;
        self.invoices.list(filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, TripStatus};
    use crate::ports::NewTrip;
    use crate::services::fakes::{InMemoryInvoices, InMemoryTrips};
    use rust_decimal_macros::dec;

    async fn fixture_with_trip() -> (InvoiceIssuer, Uuid) {
        let trips = Arc::new(InMemoryTrips::new());
        let trip = trips
            .seed(NewTrip {
                driver_id: Uuid::new_v4(),
                passenger_id: Uuid::new_v4(),
                start_location: GeoPoint::new(40.7128, -74.0060),
                end_location: GeoPoint::new(40.73, -74.0),
                cost: None,
            })
            .await;
        assert_eq!(trip.status, TripStatus::Active);
        let issuer = InvoiceIssuer::new(Arc::new(InMemoryInvoices::new()), trips);
        (issuer, trip.id)
    }

    #[tokio::test]
    async fn issue_requires_an_existing_trip() {
        let (issuer, _) = fixture_with_trip().await;
        let err = issuer.issue(Uuid::new_v4(), dec!(10.00)).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn issue_rejects_negative_amounts() {
        let (issuer, trip_id) = fixture_with_trip().await;
        let err = issuer.issue(trip_id, dec!(-5.00)).await.unwrap_err();
        assert!(matches!(err, PortError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn issued_invoice_is_retrievable_by_trip() {
        let (issuer, trip_id) = fixture_with_trip().await;
        let invoice = issuer.issue(trip_id, dec!(15.50)).await.unwrap();
        assert_eq!(invoice.trip_id, trip_id);
        assert_eq!(invoice.amount, dec!(15.50));

        let fetched = issuer.for_trip(trip_id).await.unwrap();
        assert_eq!(fetched.id, invoice.id);
        assert_eq!(issuer.get(invoice.id).await.unwrap().amount, dec!(15.50));
    }

    #[tokio::test]
    async fn missing_invoice_for_trip_is_not_found() {
        let (issuer, trip_id) = fixture_with_trip().await;
        let err = issuer.for_trip(trip_id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_rejects_bad_pagination() {
        let (issuer, _) = fixture_with_trip().await;
        let filters = InvoiceFilters {
            page: 0,
            limit: 10,
            ..Default::default()
        };
        assert!(matches!(
            issuer.list(filters).await.unwrap_err(),
            PortError::InvalidArgument(_)
        ));

        let filters = InvoiceFilters {
            page: 1,
            limit: 500,
            ..Default::default()
        };
        assert!(matches!(
            issuer.list(filters).await.unwrap_err(),
            PortError::InvalidArgument(_)
        ));
    }
}
