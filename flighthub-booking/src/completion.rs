use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use flighthub_core::repository::PendingPaymentRepository;
use flighthub_core::{Booking, PaymentStatus, StoreError};

use crate::error::{BookingError, BookingResult};

/// Turns a pending payment into a confirmed booking.
///
/// ```text
/// pending   --complete, before deadline--> completed (+ Booking)
/// pending   --deadline reached-----------> expired
/// completed --complete--> InvalidState
/// expired   --complete--> Expired
/// ```
pub struct PaymentCompletion {
    pending: Arc<dyn PendingPaymentRepository>,
}

impl PaymentCompletion {
    pub fn new(pending: Arc<dyn PendingPaymentRepository>) -> Self {
        Self { pending }
    }

    pub async fn complete(&self, reference: &str) -> BookingResult<Booking> {
        let now = Utc::now();
        let record = self
            .pending
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Pending payment {reference}")))?;

        let expired = BookingError::Expired {
            reference: reference.to_string(),
            expires_at: record.expires_at,
        };

        match record.status {
            PaymentStatus::Pending => {}
            PaymentStatus::Expired => return Err(expired),
            status => {
                return Err(BookingError::InvalidState {
                    reference: reference.to_string(),
                    status,
                })
            }
        }

        if record.deadline_passed(now) {
            // Lazy expiry. A conflict means someone else already moved it.
            match self
                .pending
                .transition(reference, PaymentStatus::Pending, PaymentStatus::Expired)
                .await
            {
                Ok(_) | Err(StoreError::StatusConflict { .. }) => {}
                Err(e) => warn!(reference, "Could not mark pending payment expired: {}", e),
            }
            info!(reference, "Completion refused, payment deadline passed");
            return Err(expired);
        }

        // The store re-checks status and deadline inside its own unit of work,
        // so a sweep that won the race is observed here rather than overwritten.
        match self.pending.promote(reference, now).await {
            Ok(booking) => {
                info!(
                    reference,
                    booking_reference = %booking.booking_reference,
                    "Pending payment completed"
                );
                Ok(booking)
            }
            Err(StoreError::StatusConflict { current: PaymentStatus::Expired, .. }) => Err(expired),
            Err(StoreError::StatusConflict { current, .. }) => Err(BookingError::InvalidState {
                reference: reference.to_string(),
                status: current,
            }),
            Err(StoreError::NotFound(what)) => Err(BookingError::NotFound(what)),
            Err(e) => {
                error!(reference, "Payment completion failed, not retrying: {}", e);
                Err(BookingError::Internal(e.to_string()))
            }
        }
    }
}
