use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use flighthub_core::pii::Masked;
use flighthub_core::pricing::{parse_add_ons, quote_total, to_money};
use flighthub_core::repository::{BookingRepository, FlightRepository};
use flighthub_core::validation::violations;
use flighthub_core::{Booking, FieldViolation, Flight, NewBooking};

use crate::error::{BookingError, BookingResult};

/// Rules every priced request shares: the flight must exist and, when
/// `verify_totals` is on, the submitted total must equal the quote.
pub(crate) async fn check_pricing(
    flights: &dyn FlightRepository,
    verify_totals: bool,
    flight_id: i32,
    passengers: i32,
    add_ons: &[String],
    total_price: Decimal,
    found: &mut Vec<FieldViolation>,
) -> BookingResult<Option<Flight>> {
    if total_price.is_sign_negative() {
        found.push(FieldViolation::new("totalPrice", "Total price cannot be negative"));
    }

    let flight = match flights.get(flight_id).await? {
        Some(flight) => flight,
        None => {
            found.push(FieldViolation::new("flightId", format!("Unknown flight {flight_id}")));
            return Ok(None);
        }
    };

    if verify_totals && passengers > 0 {
        match parse_add_ons(add_ons) {
            Ok(parsed) => {
                let quoted = quote_total(flight.price, passengers as u32, &parsed);
                if to_money(total_price) != quoted {
                    found.push(FieldViolation::new(
                        "totalPrice",
                        format!("Total price {total_price} does not match the quoted {quoted}"),
                    ));
                }
            }
            Err(unknown) => found.push(FieldViolation::new("addOns", unknown.to_string())),
        }
    }
    Ok(Some(flight))
}

/// Direct ("pay now") bookings.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    flights: Arc<dyn FlightRepository>,
    verify_totals: bool,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        flights: Arc<dyn FlightRepository>,
        verify_totals: bool,
    ) -> Self {
        Self {
            bookings,
            flights,
            verify_totals,
        }
    }

    pub async fn create(&self, input: NewBooking) -> BookingResult<Booking> {
        let mut found = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations(&errors),
        };
        let add_ons = input.add_ons.clone().unwrap_or_default();
        check_pricing(
            self.flights.as_ref(),
            self.verify_totals,
            input.flight_id,
            input.passenger_count(),
            &add_ons,
            input.total_price,
            &mut found,
        )
        .await?;
        if !found.is_empty() {
            return Err(BookingError::Validation(found));
        }

        let mut input = input;
        input.total_price = to_money(input.total_price);
        let booking = self.bookings.insert(input).await?;
        info!(
            reference = %booking.booking_reference,
            flight_id = booking.flight_id,
            email = %Masked(&booking.passenger_email),
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn get_by_reference(&self, reference: &str) -> BookingResult<Booking> {
        self.bookings
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking {reference}")))
    }
}
