use chrono::{DateTime, Utc};
use flighthub_core::{FieldViolation, PaymentStatus, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Pending payment {reference} is already {status}")]
    InvalidState {
        reference: String,
        status: PaymentStatus,
    },

    #[error("Pending payment {reference} expired at {expires_at}")]
    Expired {
        reference: String,
        expires_at: DateTime<Utc>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Everything except `Internal` can be fixed by the caller.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BookingError::Internal(_))
    }

    /// Text a client can show without further interpretation.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(_) => "Please check the highlighted fields and try again".to_string(),
            BookingError::NotFound(what) => format!("{what} was not found"),
            BookingError::InvalidState { status: PaymentStatus::Completed, .. } => {
                "This payment has already been processed".to_string()
            }
            BookingError::InvalidState { status, .. } => {
                format!("This payment can no longer be completed (status: {status})")
            }
            BookingError::Expired { .. } => {
                "The payment deadline has passed. Please make a new booking".to_string()
            }
            BookingError::Internal(_) => "Something went wrong on our side. Please try again later".to_string(),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => BookingError::NotFound(what),
            StoreError::StatusConflict { reference, current } => BookingError::InvalidState {
                reference,
                status: current,
            },
            other => BookingError::Internal(other.to_string()),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
