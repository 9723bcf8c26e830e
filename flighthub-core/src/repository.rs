use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{
    Booking, Flight, NewBooking, NewPendingPayment, NewSearchRequest, PaymentStatus,
    PendingPayment, SearchRequest,
};
use crate::StoreResult;

/// Read access to the seeded flight catalog
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Flights on the exact (departure, arrival) route, in storage order.
    async fn search(&self, from: &str, to: &str) -> StoreResult<Vec<Flight>>;

    async fn get(&self, id: i32) -> StoreResult<Option<Flight>>;
}

/// Append-only store of confirmed bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Assigns id, a unique booking reference and the creation time.
    /// Unset passengers, add-ons and status take their defaults.
    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking>;

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<Booking>>;
}

/// Deferred-payment tickets and their status lifecycle
#[async_trait]
pub trait PendingPaymentRepository: Send + Sync {
    async fn insert(&self, pending: NewPendingPayment) -> StoreResult<PendingPayment>;

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<PendingPayment>>;

    async fn list_by_status(&self, status: PaymentStatus) -> StoreResult<Vec<PendingPayment>>;

    /// Compare-and-set on status. Applies `to` only if the record is
    /// currently `from` and the move is a legal forward transition.
    ///
    /// Returns `NotFound` for an unknown reference and `StatusConflict`
    /// carrying the current status when the record has already moved on.
    async fn transition(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> StoreResult<PendingPayment>;

    /// Moves every pending record with `expires_at <= now` to expired and
    /// returns how many changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Promotes a pending payment into a confirmed booking as one unit.
    ///
    /// Re-checks under the store's own isolation that the record is still
    /// pending and `now < expires_at`, inserts the booking, then marks the
    /// record completed. If any step fails nothing is written, except that a
    /// record found overdue is moved to expired before `StatusConflict` is
    /// returned.
    async fn promote(&self, reference: &str, now: DateTime<Utc>) -> StoreResult<Booking>;
}

/// Audit log of flight searches
#[async_trait]
pub trait SearchLogRepository: Send + Sync {
    async fn record(&self, search: NewSearchRequest) -> StoreResult<SearchRequest>;
}
