//! Process-local backend. Everything lives behind one lock, so each trait
//! method is atomic with respect to every other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use flighthub_core::reference::{allocate, ReferenceKind, MAX_ATTEMPTS};
use flighthub_core::repository::{
    BookingRepository, FlightRepository, PendingPaymentRepository, SearchLogRepository,
};
use flighthub_core::{
    Booking, Flight, NewBooking, NewPendingPayment, NewSearchRequest, PaymentStatus,
    PendingPayment, SearchRequest, StoreError, StoreResult,
};

use crate::seed::seed_flights;

#[derive(Default)]
struct Tables {
    flights: Vec<Flight>,
    bookings: Vec<Booking>,
    pending: Vec<PendingPayment>,
    searches: Vec<SearchRequest>,
}

impl Tables {
    fn next_booking_id(&self) -> i32 {
        self.bookings.len() as i32 + 1
    }

    fn insert_booking(&mut self, booking: NewBooking, now: DateTime<Utc>) -> StoreResult<Booking> {
        let reference = allocate(ReferenceKind::Booking, |candidate| {
            self.bookings.iter().any(|b| b.booking_reference == candidate)
        })
        .ok_or(StoreError::ReferenceExhausted(MAX_ATTEMPTS))?;

        let booking = booking.into_booking(self.next_booking_id(), reference, now);
        self.bookings.push(booking.clone());
        Ok(booking)
    }

    fn pending_mut(&mut self, reference: &str) -> StoreResult<&mut PendingPayment> {
        self.pending
            .iter_mut()
            .find(|p| p.ticket_reference == reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// A store holding the demo flight catalog and nothing else.
    pub fn new() -> Self {
        Self::with_flights(seed_flights())
    }

    pub fn with_flights(flights: Vec<Flight>) -> Self {
        info!(flights = flights.len(), "In-memory store ready");
        Self {
            tables: RwLock::new(Tables {
                flights,
                ..Tables::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn search(&self, from: &str, to: &str) -> StoreResult<Vec<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights
            .iter()
            .filter(|f| f.departure_airport == from && f.arrival_airport == to)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> StoreResult<Option<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables.flights.iter().find(|f| f.id == id).cloned())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;
        tables.insert_booking(booking, Utc::now())
    }

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.booking_reference == reference)
            .cloned())
    }
}

#[async_trait]
impl PendingPaymentRepository for MemoryStore {
    async fn insert(&self, pending: NewPendingPayment) -> StoreResult<PendingPayment> {
        let mut tables = self.tables.write().await;
        let reference = allocate(ReferenceKind::Ticket, |candidate| {
            tables.pending.iter().any(|p| p.ticket_reference == candidate)
        })
        .ok_or(StoreError::ReferenceExhausted(MAX_ATTEMPTS))?;

        let id = tables.pending.len() as i32 + 1;
        let record = pending.into_pending(id, reference, Utc::now());
        tables.pending.push(record.clone());
        Ok(record)
    }

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<PendingPayment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pending
            .iter()
            .find(|p| p.ticket_reference == reference)
            .cloned())
    }

    async fn list_by_status(&self, status: PaymentStatus) -> StoreResult<Vec<PendingPayment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pending
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    async fn transition(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> StoreResult<PendingPayment> {
        let mut tables = self.tables.write().await;
        let record = tables.pending_mut(reference)?;
        if record.status != from || !from.can_transition_to(to) {
            return Err(StoreError::StatusConflict {
                reference: reference.to_string(),
                current: record.status,
            });
        }
        record.status = to;
        debug!(reference, %from, %to, "Pending payment transitioned");
        Ok(record.clone())
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut expired = 0;
        for record in tables.pending.iter_mut().filter(|p| p.is_overdue(now)) {
            record.status = PaymentStatus::Expired;
            expired += 1;
        }
        Ok(expired)
    }

    async fn promote(&self, reference: &str, now: DateTime<Utc>) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;
        let record = tables.pending_mut(reference)?;

        if record.is_overdue(now) {
            record.status = PaymentStatus::Expired;
        }
        if record.status != PaymentStatus::Pending {
            return Err(StoreError::StatusConflict {
                reference: reference.to_string(),
                current: record.status,
            });
        }

        let new_booking = NewBooking::from_pending(record);
        let booking = tables.insert_booking(new_booking, now)?;
        // Still under the same write guard, so the record cannot have moved.
        tables.pending_mut(reference)?.status = PaymentStatus::Completed;
        Ok(booking)
    }
}

#[async_trait]
impl SearchLogRepository for MemoryStore {
    async fn record(&self, search: NewSearchRequest) -> StoreResult<SearchRequest> {
        let mut tables = self.tables.write().await;
        let entry = SearchRequest {
            id: tables.searches.len() as i32 + 1,
            from: search.from,
            to: search.to,
            departure_date: search.departure_date,
            return_date: search.return_date,
            passengers: search.passengers,
            class: search.class,
            created_at: Utc::now(),
        };
        tables.searches.push(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use flighthub_core::PassengerDetails;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn new_booking() -> NewBooking {
        NewBooking {
            flight_id: 2,
            passenger_name: "Ada Lovelace".to_string(),
            passenger_email: "ada@example.com".to_string(),
            passenger_phone: "+44 20 7946 0000".to_string(),
            passengers: None,
            total_price: Decimal::new(98_500, 2),
            add_ons: None,
            status: None,
        }
    }

    fn new_pending(expires_at: DateTime<Utc>) -> NewPendingPayment {
        NewPendingPayment {
            flight_id: 2,
            passenger_name: "Ada Lovelace".to_string(),
            passenger_email: "ada@example.com".to_string(),
            passenger_phone: "+44 20 7946 0000".to_string(),
            passenger_details: PassengerDetails::new("Ada", "Lovelace", "ada@example.com", "+44 20 7946 0000"),
            passengers: 2,
            total_price: Decimal::new(203_000, 2),
            add_ons: vec!["Seat Selection".to_string()],
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_search_filters_exact_route() {
        let store = MemoryStore::new();
        let flights = FlightRepository::search(&store, "LHR", "AMS").await.unwrap();
        let numbers: Vec<_> = flights.iter().map(|f| f.flight_number.as_str()).collect();
        assert_eq!(numbers, vec!["KL1007", "BA431"]);

        assert!(FlightRepository::search(&store, "AMS", "LHR").await.unwrap().is_empty());
        assert_eq!(store.get(7).await.unwrap().unwrap().flight_number, "EK1");
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_booking_round_trip_with_defaults() {
        let store = MemoryStore::new();
        let booking = BookingRepository::insert(&store, new_booking()).await.unwrap();
        assert_eq!(booking.id, 1);
        assert_eq!(booking.passengers, 1);
        assert!(ReferenceKind::Booking.is_well_formed(&booking.booking_reference));

        let fetched = BookingRepository::get_by_reference(&store, &booking.booking_reference)
            .await
            .unwrap();
        assert_eq!(fetched, Some(booking));
        assert!(BookingRepository::get_by_reference(&store, "NOPE00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_references_are_unique() {
        let store = MemoryStore::new();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let booking = BookingRepository::insert(&store, new_booking()).await.unwrap();
            assert!(seen.insert(booking.booking_reference));
        }
        for _ in 0..200 {
            let pending = PendingPaymentRepository::insert(&store, new_pending(Utc::now() + Duration::days(1)))
                .await
                .unwrap();
            assert!(ReferenceKind::Ticket.is_well_formed(&pending.ticket_reference));
            assert!(seen.insert(pending.ticket_reference));
        }
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = MemoryStore::new();
        let pending = PendingPaymentRepository::insert(&store, new_pending(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        let reference = pending.ticket_reference.as_str();

        let done = store
            .transition(reference, PaymentStatus::Pending, PaymentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, PaymentStatus::Completed);

        match store
            .transition(reference, PaymentStatus::Pending, PaymentStatus::Expired)
            .await
        {
            Err(StoreError::StatusConflict { current, .. }) => assert_eq!(current, PaymentStatus::Completed),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(matches!(
            store.transition("TKT000000", PaymentStatus::Pending, PaymentStatus::Expired).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_expire_overdue_is_idempotent() {
        let store = MemoryStore::new();
        let now = Utc::now();
        PendingPaymentRepository::insert(&store, new_pending(now - Duration::minutes(1))).await.unwrap();
        PendingPaymentRepository::insert(&store, new_pending(now)).await.unwrap();
        PendingPaymentRepository::insert(&store, new_pending(now + Duration::hours(1))).await.unwrap();

        assert_eq!(store.expire_overdue(now).await.unwrap(), 2);
        assert_eq!(store.expire_overdue(now).await.unwrap(), 0);
        assert_eq!(store.list_by_status(PaymentStatus::Pending).await.unwrap().len(), 1);
        assert_eq!(store.list_by_status(PaymentStatus::Expired).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_promote_copies_fields_and_completes() {
        let store = MemoryStore::new();
        let pending = PendingPaymentRepository::insert(&store, new_pending(Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        let booking = store.promote(&pending.ticket_reference, Utc::now()).await.unwrap();
        assert_eq!(booking.flight_id, pending.flight_id);
        assert_eq!(booking.passengers, 2);
        assert_eq!(booking.total_price, pending.total_price);
        assert_eq!(booking.add_ons, pending.add_ons);

        let after = PendingPaymentRepository::get_by_reference(&store, &pending.ticket_reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, PaymentStatus::Completed);

        assert!(matches!(
            store.promote(&pending.ticket_reference, Utc::now()).await,
            Err(StoreError::StatusConflict { current: PaymentStatus::Completed, .. })
        ));
    }

    #[tokio::test]
    async fn test_promote_overdue_expires_without_booking() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let pending = PendingPaymentRepository::insert(&store, new_pending(now + Duration::milliseconds(1)))
            .await
            .unwrap();

        let later = now + Duration::milliseconds(10);
        assert!(matches!(
            store.promote(&pending.ticket_reference, later).await,
            Err(StoreError::StatusConflict { current: PaymentStatus::Expired, .. })
        ));
        assert!(store.tables.read().await.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_promote_creates_one_booking() {
        let store = Arc::new(MemoryStore::new());
        let pending = PendingPaymentRepository::insert(store.as_ref(), new_pending(Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let reference = pending.ticket_reference.clone();
            handles.push(tokio::spawn(async move { store.promote(&reference, Utc::now()).await }));
        }
        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.tables.read().await.bookings.len(), 1);
    }

    #[tokio::test]
    async fn test_search_log_appends() {
        let store = MemoryStore::new();
        let entry = store
            .record(NewSearchRequest {
                from: "LHR".to_string(),
                to: "AMS".to_string(),
                departure_date: "2025-03-01".to_string(),
                return_date: None,
                passengers: 1,
                class: "economy".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(store.tables.read().await.searches.len(), 1);
    }
}
