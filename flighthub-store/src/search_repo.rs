use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use flighthub_core::repository::SearchLogRepository;
use flighthub_core::{NewSearchRequest, SearchRequest, StoreResult};

use crate::database::backend;

pub struct PostgresSearchLogRepository {
    pool: PgPool,
}

impl PostgresSearchLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SearchRequestRow {
    id: i32,
    from_airport: String,
    to_airport: String,
    departure_date: String,
    return_date: Option<String>,
    passengers: i32,
    class: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl SearchLogRepository for PostgresSearchLogRepository {
    async fn record(&self, search: NewSearchRequest) -> StoreResult<SearchRequest> {
        let row = sqlx::query_as::<_, SearchRequestRow>(
            r#"
            INSERT INTO search_requests (from_airport, to_airport, departure_date, return_date, passengers, class)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, from_airport, to_airport, departure_date, return_date, passengers, class, created_at
            "#,
        )
        .bind(&search.from)
        .bind(&search.to)
        .bind(&search.departure_date)
        .bind(&search.return_date)
        .bind(search.passengers)
        .bind(&search.class)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(SearchRequest {
            id: row.id,
            from: row.from_airport,
            to: row.to_airport,
            departure_date: row.departure_date,
            return_date: row.return_date,
            passengers: row.passengers,
            class: row.class,
            created_at: row.created_at,
        })
    }
}
