pub mod model;
pub mod passenger;
pub mod reference;
pub mod pricing;
pub mod deadline;
pub mod repository;
pub mod validation;
pub mod pii;

pub use model::{
    Booking, BookingStatus, Flight, NewBooking, NewPendingPayment, NewSearchRequest,
    PaymentStatus, PendingPayment, SearchRequest,
};
pub use passenger::PassengerDetails;
pub use pricing::AddOn;
pub use deadline::PaymentDeadline;
pub use validation::FieldViolation;

/// Failures reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Pending payment {reference} is {current}")]
    StatusConflict {
        reference: String,
        current: PaymentStatus,
    },
    #[error("Could not allocate a unique reference after {0} attempts")]
    ReferenceExhausted(usize),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
