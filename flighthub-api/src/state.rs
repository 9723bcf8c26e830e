use std::sync::Arc;

use flighthub_booking::{BookingServices, ServiceSettings};
use flighthub_store::Storage;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<BookingServices>,
}

impl AppState {
    pub fn new(storage: &Storage, settings: ServiceSettings) -> Self {
        Self {
            services: Arc::new(BookingServices::new(storage, settings)),
        }
    }
}
