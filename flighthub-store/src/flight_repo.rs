use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use flighthub_core::repository::FlightRepository;
use flighthub_core::{Flight, StoreResult};

use crate::database::backend;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i32,
    flight_number: String,
    airline: String,
    airline_code: String,
    departure_airport: String,
    arrival_airport: String,
    departure_time: String,
    arrival_time: String,
    duration: String,
    price: Decimal,
    aircraft: Option<String>,
    stops: i32,
    amenities: Vec<String>,
    available_seats: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_number: row.flight_number,
            airline: row.airline,
            airline_code: row.airline_code,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            duration: row.duration,
            price: row.price,
            aircraft: row.aircraft,
            stops: row.stops,
            amenities: row.amenities,
            available_seats: row.available_seats,
        }
    }
}

const FLIGHT_COLUMNS: &str = "id, flight_number, airline, airline_code, departure_airport, \
     arrival_airport, departure_time, arrival_time, duration, price, aircraft, stops, \
     amenities, available_seats";

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn search(&self, from: &str, to: &str) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE departure_airport = $1 AND arrival_airport = $2 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn get(&self, id: i32) -> StoreResult<Option<Flight>> {
        let sql = format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1");
        let row = sqlx::query_as::<_, FlightRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Flight::from))
    }
}
