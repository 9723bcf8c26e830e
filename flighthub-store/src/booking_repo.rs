use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use flighthub_core::reference::{ReferenceKind, MAX_ATTEMPTS};
use flighthub_core::repository::BookingRepository;
use flighthub_core::{Booking, BookingStatus, NewBooking, StoreError, StoreResult};

use crate::database::backend;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i32,
    booking_reference: String,
    flight_id: i32,
    passenger_name: String,
    passenger_email: String,
    passenger_phone: String,
    passengers: i32,
    total_price: Decimal,
    add_ons: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(StoreError::Backend)?;
        Ok(Booking {
            id: row.id,
            booking_reference: row.booking_reference,
            flight_id: row.flight_id,
            passenger_name: row.passenger_name,
            passenger_email: row.passenger_email,
            passenger_phone: row.passenger_phone,
            passengers: row.passengers,
            total_price: row.total_price,
            add_ons: row.add_ons,
            status,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, booking_reference, flight_id, passenger_name, \
     passenger_email, passenger_phone, passengers, total_price, add_ons, status, created_at";

/// Inserts on the given connection, drawing a new reference whenever the
/// unique index rejects one. Shared with pending-payment promotion so both
/// run inside the caller's transaction when there is one.
pub(crate) async fn insert_booking(
    conn: &mut PgConnection,
    booking: NewBooking,
    created_at: DateTime<Utc>,
) -> StoreResult<Booking> {
    let passengers = booking.passenger_count();
    let status = booking.status.unwrap_or_default();
    let add_ons = booking.add_ons.unwrap_or_default();
    let sql = format!(
        "INSERT INTO bookings (booking_reference, flight_id, passenger_name, passenger_email, \
         passenger_phone, passengers, total_price, add_ons, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (booking_reference) DO NOTHING \
         RETURNING {BOOKING_COLUMNS}"
    );

    for attempt in 1..=MAX_ATTEMPTS {
        let reference = ReferenceKind::Booking.generate();
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(&reference)
            .bind(booking.flight_id)
            .bind(&booking.passenger_name)
            .bind(&booking.passenger_email)
            .bind(&booking.passenger_phone)
            .bind(passengers)
            .bind(booking.total_price)
            .bind(&add_ons)
            .bind(status.as_str())
            .bind(created_at)
            .fetch_optional(&mut *conn)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => return Booking::try_from(row),
            None => tracing::warn!(attempt, "Booking reference collision on {}, drawing again", reference),
        }
    }
    Err(StoreError::ReferenceExhausted(MAX_ATTEMPTS))
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        insert_booking(&mut conn, booking, Utc::now()).await
    }

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_reference = $1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Booking::try_from).transpose()
    }
}
