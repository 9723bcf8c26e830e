use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use flighthub_core::StoreError;

use crate::app_config::DatabaseConfig;
use crate::seed::seed_flights;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Loads the demo catalog into an empty `flights` table. Returns the
    /// number of rows inserted.
    pub async fn seed_flights_if_empty(&self) -> Result<u64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flights")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            info!(existing = count, "Flight catalog already seeded");
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for flight in seed_flights() {
            inserted += sqlx::query(
                r#"
                INSERT INTO flights (
                    id, flight_number, airline, airline_code, departure_airport, arrival_airport,
                    departure_time, arrival_time, duration, price, aircraft, stops, amenities,
                    available_seats
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(flight.id)
            .bind(&flight.flight_number)
            .bind(&flight.airline)
            .bind(&flight.airline_code)
            .bind(&flight.departure_airport)
            .bind(&flight.arrival_airport)
            .bind(&flight.departure_time)
            .bind(&flight.arrival_time)
            .bind(&flight.duration)
            .bind(flight.price)
            .bind(&flight.aircraft)
            .bind(flight.stops)
            .bind(&flight.amenities)
            .bind(flight.available_seats)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        // Explicit ids above leave the identity sequence behind.
        sqlx::query("SELECT setval(pg_get_serial_sequence('flights', 'id'), (SELECT MAX(id) FROM flights))")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(inserted, "Seeded flight catalog");
        Ok(inserted)
    }
}

/// Maps a driver error onto the storage error every repository returns.
pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}
