use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use flighthub_core::reference::{ReferenceKind, MAX_ATTEMPTS};
use flighthub_core::repository::PendingPaymentRepository;
use flighthub_core::{
    Booking, NewBooking, NewPendingPayment, PassengerDetails, PaymentStatus, PendingPayment,
    StoreError, StoreResult,
};

use crate::booking_repo::insert_booking;
use crate::database::backend;

pub struct PostgresPendingPaymentRepository {
    pool: PgPool,
}

impl PostgresPendingPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PendingPaymentRow {
    id: i32,
    ticket_reference: String,
    flight_id: i32,
    passenger_name: String,
    passenger_email: String,
    passenger_phone: String,
    passenger_details: Json<PassengerDetails>,
    passengers: i32,
    total_price: Decimal,
    add_ons: Vec<String>,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PendingPaymentRow> for PendingPayment {
    type Error = StoreError;

    fn try_from(row: PendingPaymentRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(StoreError::Backend)?;
        Ok(PendingPayment {
            id: row.id,
            ticket_reference: row.ticket_reference,
            flight_id: row.flight_id,
            passenger_name: row.passenger_name,
            passenger_email: row.passenger_email,
            passenger_phone: row.passenger_phone,
            passenger_details: row.passenger_details.0,
            passengers: row.passengers,
            total_price: row.total_price,
            add_ons: row.add_ons,
            status,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

const PENDING_COLUMNS: &str = "id, ticket_reference, flight_id, passenger_name, passenger_email, \
     passenger_phone, passenger_details, passengers, total_price, add_ons, status, expires_at, \
     created_at";

async fn set_status(
    conn: &mut PgConnection,
    reference: &str,
    status: PaymentStatus,
) -> StoreResult<()> {
    sqlx::query("UPDATE pending_payments SET status = $2 WHERE ticket_reference = $1")
        .bind(reference)
        .bind(status.as_str())
        .execute(conn)
        .await
        .map_err(backend)?;
    Ok(())
}

impl PostgresPendingPaymentRepository {
    async fn current_status(&self, reference: &str) -> StoreResult<Option<PaymentStatus>> {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM pending_payments WHERE ticket_reference = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        status
            .map(|(s,)| s.parse::<PaymentStatus>().map_err(StoreError::Backend))
            .transpose()
    }

    async fn conflict(&self, reference: &str) -> StoreError {
        match self.current_status(reference).await {
            Ok(Some(current)) => StoreError::StatusConflict {
                reference: reference.to_string(),
                current,
            },
            Ok(None) => StoreError::NotFound(reference.to_string()),
            Err(err) => err,
        }
    }
}

#[async_trait]
impl PendingPaymentRepository for PostgresPendingPaymentRepository {
    async fn insert(&self, pending: NewPendingPayment) -> StoreResult<PendingPayment> {
        let sql = format!(
            "INSERT INTO pending_payments (ticket_reference, flight_id, passenger_name, \
             passenger_email, passenger_phone, passenger_details, passengers, total_price, \
             add_ons, status, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10, $11) \
             ON CONFLICT (ticket_reference) DO NOTHING \
             RETURNING {PENDING_COLUMNS}"
        );
        let created_at = Utc::now();

        for attempt in 1..=MAX_ATTEMPTS {
            let reference = ReferenceKind::Ticket.generate();
            let row = sqlx::query_as::<_, PendingPaymentRow>(&sql)
                .bind(&reference)
                .bind(pending.flight_id)
                .bind(&pending.passenger_name)
                .bind(&pending.passenger_email)
                .bind(&pending.passenger_phone)
                .bind(Json(&pending.passenger_details))
                .bind(pending.passengers)
                .bind(pending.total_price)
                .bind(&pending.add_ons)
                .bind(pending.expires_at)
                .bind(created_at)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

            match row {
                Some(row) => return PendingPayment::try_from(row),
                None => tracing::warn!(attempt, "Ticket reference collision on {}, drawing again", reference),
            }
        }
        Err(StoreError::ReferenceExhausted(MAX_ATTEMPTS))
    }

    async fn get_by_reference(&self, reference: &str) -> StoreResult<Option<PendingPayment>> {
        let sql = format!("SELECT {PENDING_COLUMNS} FROM pending_payments WHERE ticket_reference = $1");
        let row = sqlx::query_as::<_, PendingPaymentRow>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(PendingPayment::try_from).transpose()
    }

    async fn list_by_status(&self, status: PaymentStatus) -> StoreResult<Vec<PendingPayment>> {
        let sql = format!("SELECT {PENDING_COLUMNS} FROM pending_payments WHERE status = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, PendingPaymentRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter().map(PendingPayment::try_from).collect()
    }

    async fn transition(
        &self,
        reference: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> StoreResult<PendingPayment> {
        if !from.can_transition_to(to) {
            return Err(self.conflict(reference).await);
        }

        let sql = format!(
            "UPDATE pending_payments SET status = $3 \
             WHERE ticket_reference = $1 AND status = $2 \
             RETURNING {PENDING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PendingPaymentRow>(&sql)
            .bind(reference)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => {
                debug!(reference, %from, %to, "Pending payment transitioned");
                PendingPayment::try_from(row)
            }
            None => Err(self.conflict(reference).await),
        }
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE pending_payments SET status = 'expired' WHERE status = 'pending' AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }

    async fn promote(&self, reference: &str, now: DateTime<Utc>) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let sql = format!(
            "SELECT {PENDING_COLUMNS} FROM pending_payments WHERE ticket_reference = $1 FOR UPDATE"
        );
        let record = sqlx::query_as::<_, PendingPaymentRow>(&sql)
            .bind(reference)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?
            .map(PendingPayment::try_from)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;

        if record.is_overdue(now) {
            set_status(&mut tx, reference, PaymentStatus::Expired).await?;
            tx.commit().await.map_err(backend)?;
            info!(reference, "Pending payment expired at completion");
            return Err(StoreError::StatusConflict {
                reference: reference.to_string(),
                current: PaymentStatus::Expired,
            });
        }
        if record.status != PaymentStatus::Pending {
            return Err(StoreError::StatusConflict {
                reference: reference.to_string(),
                current: record.status,
            });
        }

        let booking = insert_booking(&mut tx, NewBooking::from_pending(&record), now).await?;
        set_status(&mut tx, reference, PaymentStatus::Completed).await?;
        tx.commit().await.map_err(backend)?;
        Ok(booking)
    }
}
