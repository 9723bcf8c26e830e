pub mod app_config;
pub mod database;
pub mod seed;
pub mod memory;
pub mod flight_repo;
pub mod booking_repo;
pub mod pending_repo;
pub mod search_repo;

use std::sync::Arc;

use flighthub_core::repository::{
    BookingRepository, FlightRepository, PendingPaymentRepository, SearchLogRepository,
};

pub use app_config::{Config, StorageBackend};
pub use database::DbClient;
pub use memory::MemoryStore;

/// One handle per repository, all backed by the same store.
#[derive(Clone)]
pub struct Storage {
    pub flights: Arc<dyn FlightRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub pending_payments: Arc<dyn PendingPaymentRepository>,
    pub search_log: Arc<dyn SearchLogRepository>,
}

impl Storage {
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            flights: store.clone(),
            bookings: store.clone(),
            pending_payments: store.clone(),
            search_log: store,
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        Self {
            flights: Arc::new(flight_repo::PostgresFlightRepository::new(db.pool.clone())),
            bookings: Arc::new(booking_repo::PostgresBookingRepository::new(db.pool.clone())),
            pending_payments: Arc::new(pending_repo::PostgresPendingPaymentRepository::new(db.pool.clone())),
            search_log: Arc::new(search_repo::PostgresSearchLogRepository::new(db.pool.clone())),
        }
    }
}
