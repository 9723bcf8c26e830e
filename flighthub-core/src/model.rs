use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::passenger::PassengerDetails;

/// A scheduled flight from the seeded catalog. Never mutated after seeding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: i32,
    pub flight_number: String,
    pub airline: String,
    pub airline_code: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: Decimal,
    pub aircraft: Option<String>,
    pub stops: i32,
    pub amenities: Vec<String>,
    pub available_seats: i32,
}

/// Display flag carried on a confirmed booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "pending" => Ok(BookingStatus::Pending),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i32,
    pub booking_reference: String,
    pub flight_id: i32,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub passengers: i32,
    pub total_price: Decimal,
    pub add_ons: Vec<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking fields supplied by the caller; id, reference and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[validate(range(min = 1, message = "flightId must be a positive id"))]
    pub flight_id: i32,
    #[validate(length(min = 1, message = "Passenger name is required"))]
    pub passenger_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub passenger_email: String,
    #[validate(length(min = 1, message = "Passenger phone is required"))]
    pub passenger_phone: String,
    #[validate(range(min = 1, max = 9, message = "Passenger count must be between 1 and 9"))]
    #[serde(default)]
    pub passengers: Option<i32>,
    pub total_price: Decimal,
    #[serde(default)]
    pub add_ons: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

impl NewBooking {
    pub fn passenger_count(&self) -> i32 {
        self.passengers.unwrap_or(1)
    }

    /// The confirmed booking a completed pending payment turns into.
    pub fn from_pending(pending: &PendingPayment) -> Self {
        Self {
            flight_id: pending.flight_id,
            passenger_name: pending.passenger_name.clone(),
            passenger_email: pending.passenger_email.clone(),
            passenger_phone: pending.passenger_phone.clone(),
            passengers: Some(pending.passengers),
            total_price: pending.total_price,
            add_ons: Some(pending.add_ons.clone()),
            status: Some(BookingStatus::Confirmed),
        }
    }

    pub fn into_booking(self, id: i32, booking_reference: String, created_at: DateTime<Utc>) -> Booking {
        let passengers = self.passenger_count();
        Booking {
            id,
            booking_reference,
            flight_id: self.flight_id,
            passenger_name: self.passenger_name,
            passenger_email: self.passenger_email,
            passenger_phone: self.passenger_phone,
            passengers,
            total_price: self.total_price,
            add_ons: self.add_ons.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            created_at,
        }
    }
}

/// Lifecycle of a deferred payment. Transitions only move forward out of
/// `Pending`; `Completed` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Expired)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub id: i32,
    pub ticket_reference: String,
    pub flight_id: i32,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub passenger_details: PassengerDetails,
    pub passengers: i32,
    pub total_price: Decimal,
    pub add_ons: Vec<String>,
    pub status: PaymentStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PendingPayment {
    /// True once the deadline has been reached, whatever the stored status.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A record still marked pending whose deadline has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::Pending && self.deadline_passed(now)
    }
}

/// Pending payment fields with the deadline already resolved.
#[derive(Debug, Clone)]
pub struct NewPendingPayment {
    pub flight_id: i32,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub passenger_details: PassengerDetails,
    pub passengers: i32,
    pub total_price: Decimal,
    pub add_ons: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewPendingPayment {
    pub fn into_pending(self, id: i32, ticket_reference: String, created_at: DateTime<Utc>) -> PendingPayment {
        PendingPayment {
            id,
            ticket_reference,
            flight_id: self.flight_id,
            passenger_name: self.passenger_name,
            passenger_email: self.passenger_email,
            passenger_phone: self.passenger_phone,
            passenger_details: self.passenger_details,
            passengers: self.passengers,
            total_price: self.total_price,
            add_ons: self.add_ons,
            status: PaymentStatus::Pending,
            expires_at: self.expires_at,
            created_at,
        }
    }
}

/// Audit record of a flight search. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub id: i32,
    pub from: String,
    pub to: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub passengers: i32,
    pub class: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSearchRequest {
    pub from: String,
    pub to: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub passengers: i32,
    pub class: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_is_forward_only() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Expired));
        for terminal in [Completed, Expired] {
            assert!(terminal.is_terminal());
            for next in [Pending, Completed, Expired] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_new_booking_defaults() {
        let json = r#"
            {
                "flightId": 2,
                "passengerName": "Ada Lovelace",
                "passengerEmail": "ada@example.com",
                "passengerPhone": "+44 20 7946 0000",
                "totalPrice": "985.00"
            }
        "#;
        let input: NewBooking = serde_json::from_str(json).expect("Failed to deserialize");
        let booking = input.into_booking(1, "ABC123".to_string(), Utc::now());
        assert_eq!(booking.passengers, 1);
        assert!(booking.add_ons.is_empty());
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_price.to_string(), "985.00");
    }

    #[test]
    fn test_new_booking_rejects_bad_email_and_zero_passengers() {
        let input = NewBooking {
            flight_id: 1,
            passenger_name: "Ada".to_string(),
            passenger_email: "not-an-email".to_string(),
            passenger_phone: "123".to_string(),
            passengers: Some(0),
            total_price: Decimal::new(100, 0),
            add_ons: None,
            status: None,
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [PaymentStatus::Pending, PaymentStatus::Completed, PaymentStatus::Expired] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<PaymentStatus>().is_err());
    }
}
