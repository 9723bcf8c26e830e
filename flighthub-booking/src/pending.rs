use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use flighthub_core::pii::Masked;
use flighthub_core::pricing::to_money;
use flighthub_core::repository::{FlightRepository, PendingPaymentRepository};
use flighthub_core::validation::violations;
use flighthub_core::{
    FieldViolation, NewPendingPayment, PassengerDetails, PaymentDeadline, PaymentStatus,
    PendingPayment, StoreError,
};

use crate::bookings::check_pricing;
use crate::error::{BookingError, BookingResult};

/// Body of `POST /pending-payments`.
///
/// Contact fields fall back to the ones in `passenger_details` when omitted,
/// and `expires_at` falls back to the configured deadline policy.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePendingPayment {
    #[validate(range(min = 1, message = "flightId must be a positive id"))]
    pub flight_id: i32,
    #[validate(length(min = 1, message = "Passenger name is required"))]
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    #[serde(default)]
    pub passenger_email: Option<String>,
    #[validate(length(min = 1, message = "Passenger phone is required"))]
    #[serde(default)]
    pub passenger_phone: Option<String>,
    pub passenger_details: PassengerDetails,
    #[validate(range(min = 1, max = 9, message = "Passenger count must be between 1 and 9"))]
    #[serde(default)]
    pub passengers: Option<i32>,
    pub total_price: Decimal,
    #[serde(default)]
    pub add_ons: Option<Vec<String>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreatePendingPayment {
    pub fn new(flight_id: i32, passenger_details: PassengerDetails, passengers: i32, total_price: Decimal) -> Self {
        Self {
            flight_id,
            passenger_name: None,
            passenger_email: None,
            passenger_phone: None,
            passenger_details,
            passengers: Some(passengers),
            total_price,
            add_ons: None,
            expires_at: None,
        }
    }

    fn violations(&self, now: DateTime<Utc>) -> Vec<FieldViolation> {
        let mut found = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations(&errors),
        };
        if let Err(details) = self.passenger_details.check() {
            found.extend(details.into_iter().map(|v| {
                FieldViolation::new(format!("passengerDetails.{}", v.field), v.message)
            }));
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                found.push(FieldViolation::new("expiresAt", "Payment deadline must be in the future"));
            }
        }
        found
    }
}

pub struct PendingPaymentService {
    pending: Arc<dyn PendingPaymentRepository>,
    flights: Arc<dyn FlightRepository>,
    deadline: PaymentDeadline,
    verify_totals: bool,
}

impl PendingPaymentService {
    pub fn new(
        pending: Arc<dyn PendingPaymentRepository>,
        flights: Arc<dyn FlightRepository>,
        deadline: PaymentDeadline,
        verify_totals: bool,
    ) -> Self {
        Self {
            pending,
            flights,
            deadline,
            verify_totals,
        }
    }

    pub async fn create(&self, input: CreatePendingPayment) -> BookingResult<PendingPayment> {
        let now = Utc::now();
        let mut found = input.violations(now);
        let passengers = input.passengers.unwrap_or(1);
        let add_ons = input.add_ons.clone().unwrap_or_default();
        check_pricing(
            self.flights.as_ref(),
            self.verify_totals,
            input.flight_id,
            passengers,
            &add_ons,
            input.total_price,
            &mut found,
        )
        .await?;
        if !found.is_empty() {
            return Err(BookingError::Validation(found));
        }

        let details = input.passenger_details;
        let record = NewPendingPayment {
            flight_id: input.flight_id,
            passenger_name: input.passenger_name.unwrap_or_else(|| details.full_name()),
            passenger_email: input.passenger_email.unwrap_or_else(|| details.email.clone()),
            passenger_phone: input.passenger_phone.unwrap_or_else(|| details.phone.clone()),
            passenger_details: details,
            passengers,
            total_price: to_money(input.total_price),
            add_ons,
            expires_at: input.expires_at.unwrap_or_else(|| self.deadline.deadline_from(now)),
        };

        let pending = self.pending.insert(record).await?;
        info!(
            reference = %pending.ticket_reference,
            flight_id = pending.flight_id,
            email = %Masked(&pending.passenger_email),
            expires_at = %pending.expires_at,
            "Pending payment created"
        );
        Ok(pending)
    }

    /// Looks a record up, expiring it first if its deadline has passed.
    pub async fn get_by_reference(&self, reference: &str) -> BookingResult<PendingPayment> {
        let record = self.find(reference).await?;
        if !record.is_overdue(Utc::now()) {
            return Ok(record);
        }
        self.expire(reference).await
    }

    /// Open records only: status pending and deadline not yet reached.
    pub async fn list_pending(&self) -> BookingResult<Vec<PendingPayment>> {
        let now = Utc::now();
        let mut records = self.pending.list_by_status(PaymentStatus::Pending).await?;
        records.retain(|p| !p.deadline_passed(now));
        Ok(records)
    }

    /// Moves a record forward from whatever it is now.
    ///
    /// Unknown references are `NotFound` and illegal moves `InvalidState`;
    /// nothing is silently ignored. Only expiry is allowed here. Confirming
    /// a payment goes through [`crate::PaymentCompletion`], which also
    /// creates the booking.
    pub async fn update_status(&self, reference: &str, status: PaymentStatus) -> BookingResult<PendingPayment> {
        let current = self.find(reference).await?;
        let refused = BookingError::InvalidState {
            reference: reference.to_string(),
            status: current.status,
        };
        if current.status.is_terminal() || !current.status.can_transition_to(status) {
            return Err(refused);
        }

        if status == PaymentStatus::Completed {
            if current.is_overdue(Utc::now()) {
                self.expire(reference).await?;
                return Err(BookingError::Expired {
                    reference: reference.to_string(),
                    expires_at: current.expires_at,
                });
            }
            return Err(refused);
        }

        let updated = self.pending.transition(reference, current.status, status).await?;
        debug!(reference, %status, "Pending payment status updated");
        Ok(updated)
    }

    /// Expires every overdue record. Safe to run repeatedly.
    pub async fn sweep_expired(&self) -> BookingResult<u64> {
        let expired = self.pending.expire_overdue(Utc::now()).await?;
        if expired > 0 {
            info!(expired, "Expired overdue pending payments");
        }
        Ok(expired)
    }

    async fn expire(&self, reference: &str) -> BookingResult<PendingPayment> {
        match self
            .pending
            .transition(reference, PaymentStatus::Pending, PaymentStatus::Expired)
            .await
        {
            Ok(expired) => {
                info!(reference, "Pending payment expired past its deadline");
                Ok(expired)
            }
            // Completed or expired concurrently; report what is stored now.
            Err(StoreError::StatusConflict { .. }) => self.find(reference).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, reference: &str) -> BookingResult<PendingPayment> {
        self.pending
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Pending payment {reference}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use flighthub_store::MemoryStore;

    fn service() -> PendingPaymentService {
        let store = Arc::new(MemoryStore::new());
        PendingPaymentService::new(store.clone(), store, PaymentDeadline::Hours { hours: 24 }, true)
    }

    fn grace() -> PassengerDetails {
        PassengerDetails::new("Grace", "Hopper", "grace@example.com", "+44 7700 900000")
    }

    fn input(expires_at: Option<DateTime<Utc>>) -> CreatePendingPayment {
        // BA431 for two passengers
        let mut input = CreatePendingPayment::new(2, grace(), 2, Decimal::from(1970));
        input.expires_at = expires_at;
        input
    }

    #[tokio::test]
    async fn test_create_fills_contact_and_deadline() {
        let before = Utc::now();
        let pending = service().create(input(None)).await.unwrap();

        assert_eq!(pending.status, PaymentStatus::Pending);
        assert_eq!(pending.passenger_name, "Grace Hopper");
        assert_eq!(pending.passenger_email, "grace@example.com");
        assert!(pending.ticket_reference.starts_with("TKT"));
        assert!(pending.add_ons.is_empty());
        assert!(pending.expires_at >= before + Duration::hours(24));
    }

    #[tokio::test]
    async fn test_past_deadline_is_rejected() {
        let result = service().create(input(Some(Utc::now() - Duration::seconds(1)))).await;
        match result {
            Err(BookingError::Validation(found)) => assert_eq!(found[0].field, "expiresAt"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_passenger_details_are_prefixed() {
        let mut bad = input(None);
        bad.passenger_details.email = "nope".to_string();
        match service().create(bad).await {
            Err(BookingError::Validation(found)) => {
                assert!(found.iter().any(|v| v.field == "passengerDetails.email"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overdue_record_expires_on_read_and_leaves_listing() {
        let service = service();
        let open = service.create(input(None)).await.unwrap();
        let due = service
            .create(input(Some(Utc::now() + Duration::milliseconds(1))))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let listed: Vec<_> = service
            .list_pending()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.ticket_reference)
            .collect();
        assert_eq!(listed, vec![open.ticket_reference.clone()]);

        let read = service.get_by_reference(&due.ticket_reference).await.unwrap();
        assert_eq!(read.status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_update_status_is_hardened() {
        let service = service();
        assert!(matches!(
            service.update_status("TKTNOPE00", PaymentStatus::Expired).await,
            Err(BookingError::NotFound(_))
        ));

        let pending = service.create(input(None)).await.unwrap();
        let expired = service
            .update_status(&pending.ticket_reference, PaymentStatus::Expired)
            .await
            .unwrap();
        assert_eq!(expired.status, PaymentStatus::Expired);

        assert!(matches!(
            service.update_status(&pending.ticket_reference, PaymentStatus::Completed).await,
            Err(BookingError::InvalidState { status: PaymentStatus::Expired, .. })
        ));
    }

    #[tokio::test]
    async fn test_update_status_never_completes() {
        let service = service();
        let pending = service.create(input(None)).await.unwrap();

        assert!(matches!(
            service.update_status(&pending.ticket_reference, PaymentStatus::Completed).await,
            Err(BookingError::InvalidState { status: PaymentStatus::Pending, .. })
        ));
        let stored = service.get_by_reference(&pending.ticket_reference).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_status_on_overdue_record_expires_it() {
        let service = service();
        let due = service
            .create(input(Some(Utc::now() + Duration::milliseconds(1))))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(matches!(
            service.update_status(&due.ticket_reference, PaymentStatus::Completed).await,
            Err(BookingError::Expired { .. })
        ));
        let stored = service.get_by_reference(&due.ticket_reference).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let service = service();
        service
            .create(input(Some(Utc::now() + Duration::milliseconds(1))))
            .await
            .unwrap();
        service.create(input(None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(service.sweep_expired().await.unwrap(), 1);
        assert_eq!(service.sweep_expired().await.unwrap(), 0);
        assert_eq!(service.list_pending().await.unwrap().len(), 1);
    }
}
