//! Client-side booking flow: search, select, passenger, payment, confirmation.
//!
//! Steps only advance one at a time and `back` only returns to the step
//! immediately before. Every method takes `&mut self`, so at most one
//! gateway call is in flight per wizard and a double-submitted "Pay" cannot
//! reach the server twice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

use flighthub_core::pricing::{quote_total, AddOn};
use flighthub_core::{Booking, FieldViolation, Flight, NewBooking, PassengerDetails, PendingPayment};

use crate::catalog::FlightSearch;
use crate::error::BookingError;
use crate::gateway::BookingGateway;
use crate::pending::CreatePendingPayment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Search,
    Select,
    Passenger,
    Payment,
    Confirmation,
}

impl WizardStep {
    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Search | WizardStep::Confirmation => None,
            WizardStep::Select => Some(WizardStep::Search),
            WizardStep::Passenger => Some(WizardStep::Select),
            WizardStep::Payment => Some(WizardStep::Passenger),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Search => "search",
            WizardStep::Select => "select",
            WizardStep::Passenger => "passenger",
            WizardStep::Payment => "payment",
            WizardStep::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} at the {step} step")]
    Step { step: WizardStep, action: &'static str },

    /// The request was refused; the message can be shown as-is.
    #[error("{message}")]
    Rejected {
        message: String,
        violations: Vec<FieldViolation>,
    },

    /// Server-side failure. Not resubmitted automatically.
    #[error("{0}")]
    Unavailable(String),
}

impl From<BookingError> for WizardError {
    fn from(err: BookingError) -> Self {
        let message = err.user_message();
        match err {
            BookingError::Validation(violations) => WizardError::Rejected { message, violations },
            e if e.is_client_error() => WizardError::Rejected {
                message,
                violations: Vec::new(),
            },
            _ => WizardError::Unavailable(message),
        }
    }
}

/// What the passenger step collects.
#[derive(Debug, Clone)]
pub struct PassengerSelection {
    pub details: PassengerDetails,
    pub passengers: u32,
    pub add_ons: Vec<AddOn>,
}

impl PassengerSelection {
    fn add_on_names(&self) -> Vec<String> {
        self.add_ons.iter().map(|a| a.name().to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    Paid(Booking),
    Deferred(PendingPayment),
}

pub struct BookingWizard<G: BookingGateway> {
    gateway: G,
    step: WizardStep,
    search: Option<FlightSearch>,
    results: Vec<Flight>,
    selected: Option<Flight>,
    passenger: Option<PassengerSelection>,
    total: Option<Decimal>,
    outcome: Option<WizardOutcome>,
}

impl<G: BookingGateway> BookingWizard<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            step: WizardStep::Search,
            search: None,
            results: Vec::new(),
            selected: None,
            passenger: None,
            total: None,
            outcome: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn search_params(&self) -> Option<&FlightSearch> {
        self.search.as_ref()
    }

    pub fn results(&self) -> &[Flight] {
        &self.results
    }

    pub fn selected_flight(&self) -> Option<&Flight> {
        self.selected.as_ref()
    }

    pub fn total(&self) -> Option<Decimal> {
        self.total
    }

    pub fn outcome(&self) -> Option<&WizardOutcome> {
        self.outcome.as_ref()
    }

    fn expect_step(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::Step {
                step: self.step,
                action,
            })
        }
    }

    pub async fn search(&mut self, query: FlightSearch) -> Result<&[Flight], WizardError> {
        self.expect_step(WizardStep::Search, "search")?;
        let flights = self.gateway.search_flights(&query).await?;
        debug!(results = flights.len(), "Wizard search completed");
        self.search = Some(query);
        self.results = flights;
        self.step = WizardStep::Select;
        Ok(&self.results)
    }

    pub fn select_flight(&mut self, flight_id: i32) -> Result<&Flight, WizardError> {
        self.expect_step(WizardStep::Select, "select a flight")?;
        let flight = self
            .results
            .iter()
            .find(|f| f.id == flight_id)
            .cloned()
            .ok_or_else(|| WizardError::Rejected {
                message: format!("Flight {flight_id} is not among the search results"),
                violations: Vec::new(),
            })?;
        self.step = WizardStep::Passenger;
        Ok(self.selected.insert(flight))
    }

    /// Checks the passenger form locally and prices the booking.
    pub fn submit_passenger(&mut self, selection: PassengerSelection) -> Result<Decimal, WizardError> {
        self.expect_step(WizardStep::Passenger, "submit passenger details")?;
        if let Err(violations) = selection.details.check() {
            return Err(WizardError::Rejected {
                message: "Please check the highlighted fields and try again".to_string(),
                violations,
            });
        }
        if !(1..=9).contains(&selection.passengers) {
            return Err(WizardError::Rejected {
                message: "Passenger count must be between 1 and 9".to_string(),
                violations: vec![FieldViolation::new("passengers", "must be between 1 and 9")],
            });
        }
        let flight = self.selected.as_ref().ok_or(WizardError::Step {
            step: self.step,
            action: "submit passenger details",
        })?;

        let total = quote_total(flight.price, selection.passengers, &selection.add_ons);
        self.total = Some(total);
        self.passenger = Some(selection);
        self.step = WizardStep::Payment;
        Ok(total)
    }

    fn priced(&self, action: &'static str) -> Result<(&Flight, &PassengerSelection, Decimal), WizardError> {
        self.expect_step(WizardStep::Payment, action)?;
        match (&self.selected, &self.passenger, self.total) {
            (Some(flight), Some(passenger), Some(total)) => Ok((flight, passenger, total)),
            _ => Err(WizardError::Step {
                step: self.step,
                action,
            }),
        }
    }

    pub async fn pay_now(&mut self) -> Result<&WizardOutcome, WizardError> {
        let (flight, passenger, total) = self.priced("pay")?;
        let booking = NewBooking {
            flight_id: flight.id,
            passenger_name: passenger.details.full_name(),
            passenger_email: passenger.details.email.clone(),
            passenger_phone: passenger.details.phone.clone(),
            passengers: Some(passenger.passengers as i32),
            total_price: total,
            add_ons: Some(passenger.add_on_names()),
            status: None,
        };

        let booking = self.gateway.create_booking(booking).await?;
        self.step = WizardStep::Confirmation;
        Ok(self.outcome.insert(WizardOutcome::Paid(booking)))
    }

    /// Reserves now and pays later. `expires_at` of `None` lets the server
    /// apply its deadline policy.
    pub async fn defer_payment(&mut self, expires_at: Option<DateTime<Utc>>) -> Result<&WizardOutcome, WizardError> {
        let (flight, passenger, total) = self.priced("defer payment")?;
        let mut request = CreatePendingPayment::new(
            flight.id,
            passenger.details.clone(),
            passenger.passengers as i32,
            total,
        );
        request.add_ons = Some(passenger.add_on_names());
        request.expires_at = expires_at;

        let pending = self.gateway.create_pending_payment(request).await?;
        self.step = WizardStep::Confirmation;
        Ok(self.outcome.insert(WizardOutcome::Deferred(pending)))
    }

    /// One step back. Entered data is kept so going forward again can reuse it.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::Step {
            step: self.step,
            action: "go back",
        })?;
        self.step = previous;
        Ok(previous)
    }
}
