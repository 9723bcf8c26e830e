use serde::Serialize;

use flighthub_core::{Flight, PaymentStatus, PendingPayment};

use crate::error::{BookingError, BookingResult};

/// A payment reminder assembled for display. Nothing is sent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailPreview {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Builds the reminder for a still-open pending payment.
pub fn payment_reminder(pending: &PendingPayment, flight: &Flight) -> BookingResult<EmailPreview> {
    if pending.status != PaymentStatus::Pending {
        return Err(BookingError::InvalidState {
            reference: pending.ticket_reference.clone(),
            status: pending.status,
        });
    }

    let reference = &pending.ticket_reference;
    let deadline = pending.expires_at.format("%A %-d %B %Y at %H:%M UTC").to_string();
    let route = format!("{} to {}", flight.departure_airport, flight.arrival_airport);
    let extras = if pending.add_ons.is_empty() {
        "None".to_string()
    } else {
        pending.add_ons.join(", ")
    };
    let link = format!("/complete-payment/{reference}");
    let subject = format!("Payment Required - Flight Booking {reference}");

    let text = format!(
        "Dear {name},\n\n\
         Your booking {reference} is reserved but not yet paid.\n\n\
         Flight: {airline} {number}\n\
         Route: {route}\n\
         Departure: {departure}\n\
         Passengers: {passengers}\n\
         Add-ons: {extras}\n\
         Total: GBP {total}\n\n\
         Payment must be completed by {deadline}.\n\
         Complete your payment here: {link}\n\n\
         If payment is not received by then, the reservation will be released.\n",
        name = pending.passenger_name,
        airline = flight.airline,
        number = flight.flight_number,
        departure = flight.departure_time,
        passengers = pending.passengers,
        total = pending.total_price,
    );

    let html = format!(
        "<html><body>\
         <h1>Payment Required</h1>\
         <p>Dear {name},</p>\
         <p>Your booking <strong>{reference}</strong> is reserved but not yet paid.</p>\
         <table>\
         <tr><td>Flight</td><td>{airline} {number}</td></tr>\
         <tr><td>Route</td><td>{route}</td></tr>\
         <tr><td>Departure</td><td>{departure}</td></tr>\
         <tr><td>Passengers</td><td>{passengers}</td></tr>\
         <tr><td>Add-ons</td><td>{extras}</td></tr>\
         <tr><td>Total</td><td>&pound;{total}</td></tr>\
         </table>\
         <p><strong>Payment must be completed by {deadline}.</strong></p>\
         <p><a href=\"{link}\">Complete Payment Now</a></p>\
         </body></html>",
        name = escape(&pending.passenger_name),
        reference = escape(reference),
        airline = escape(&flight.airline),
        number = escape(&flight.flight_number),
        route = escape(&route),
        departure = escape(&flight.departure_time),
        passengers = pending.passengers,
        extras = escape(&extras),
        total = pending.total_price,
        deadline = escape(&deadline),
        link = escape(&link),
    );

    Ok(EmailPreview {
        to: pending.passenger_email.clone(),
        subject,
        html,
        text,
    })
}
