use async_trait::async_trait;
use std::sync::Arc;

use flighthub_core::{Booking, Flight, NewBooking, PendingPayment};

use crate::catalog::FlightSearch;
use crate::error::BookingResult;
use crate::pending::CreatePendingPayment;
use crate::BookingServices;

/// The request/response boundary the wizard drives. Each call is one
/// round trip; implementations must not retry on their own.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn search_flights(&self, query: &FlightSearch) -> BookingResult<Vec<Flight>>;

    async fn create_booking(&self, booking: NewBooking) -> BookingResult<Booking>;

    async fn create_pending_payment(&self, request: CreatePendingPayment) -> BookingResult<PendingPayment>;
}

/// In-process gateway calling the services directly.
#[derive(Clone)]
pub struct ServiceGateway {
    services: Arc<BookingServices>,
}

impl ServiceGateway {
    pub fn new(services: Arc<BookingServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl BookingGateway for ServiceGateway {
    async fn search_flights(&self, query: &FlightSearch) -> BookingResult<Vec<Flight>> {
        self.services.catalog.search(query).await
    }

    async fn create_booking(&self, booking: NewBooking) -> BookingResult<Booking> {
        self.services.bookings.create(booking).await
    }

    async fn create_pending_payment(&self, request: CreatePendingPayment) -> BookingResult<PendingPayment> {
        self.services.pending.create(request).await
    }
}
