pub mod error;
pub mod catalog;
pub mod bookings;
pub mod pending;
pub mod completion;
pub mod expiry;
pub mod notification;
pub mod gateway;
pub mod wizard;

pub use bookings::BookingService;
pub use catalog::{FlightCatalog, FlightSearch};
pub use completion::PaymentCompletion;
pub use error::{BookingError, BookingResult};
pub use expiry::spawn_expiry_sweeper;
pub use gateway::{BookingGateway, ServiceGateway};
pub use notification::{payment_reminder, EmailPreview};
pub use pending::{CreatePendingPayment, PendingPaymentService};
pub use wizard::{BookingWizard, PassengerSelection, WizardError, WizardOutcome, WizardStep};

use flighthub_core::PaymentDeadline;
use flighthub_store::Storage;
use std::sync::Arc;

/// Settings the services read from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub deadline: PaymentDeadline,
    pub verify_totals: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            deadline: PaymentDeadline::default(),
            verify_totals: true,
        }
    }
}

/// Every service wired to one storage backend.
pub struct BookingServices {
    pub catalog: FlightCatalog,
    pub bookings: BookingService,
    pub pending: Arc<PendingPaymentService>,
    pub completion: PaymentCompletion,
}

impl BookingServices {
    pub fn new(storage: &Storage, settings: ServiceSettings) -> Self {
        Self {
            catalog: FlightCatalog::new(storage.flights.clone(), storage.search_log.clone()),
            bookings: BookingService::new(
                storage.bookings.clone(),
                storage.flights.clone(),
                settings.verify_totals,
            ),
            pending: Arc::new(PendingPaymentService::new(
                storage.pending_payments.clone(),
                storage.flights.clone(),
                settings.deadline,
                settings.verify_totals,
            )),
            completion: PaymentCompletion::new(storage.pending_payments.clone()),
        }
    }
}
