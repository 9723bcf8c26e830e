use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use flighthub_booking::{payment_reminder, CreatePendingPayment};
use flighthub_core::pii::Masked;
use flighthub_core::PendingPayment;

use crate::error::AppError;
use crate::extract::{Path, ValidatedJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pending-payments", post(create_pending_payment).get(list_pending_payments))
        .route("/pending-payments/{reference}", get(get_pending_payment))
        .route("/pending-payments/{reference}/complete", post(complete_payment))
        .route("/pending-payments/{reference}/send-email", post(send_reminder))
}

async fn create_pending_payment(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePendingPayment>,
) -> Result<(StatusCode, Json<PendingPayment>), AppError> {
    let pending = state.services.pending.create(input).await?;
    Ok((StatusCode::CREATED, Json(pending)))
}

async fn list_pending_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingPayment>>, AppError> {
    let pending = state.services.pending.list_pending().await?;
    Ok(Json(pending))
}

async fn get_pending_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<PendingPayment>, AppError> {
    let pending = state.services.pending.get_by_reference(&reference).await?;
    Ok(Json(pending))
}

async fn complete_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = state.services.completion.complete(&reference).await?;
    Ok(Json(json!({ "booking": booking })))
}

async fn send_reminder(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Value>, AppError> {
    let pending = state.services.pending.get_by_reference(&reference).await?;
    let flight = state.services.catalog.get_by_id(pending.flight_id).await?;
    let preview = payment_reminder(&pending, &flight)?;

    info!(reference = %reference, to = %Masked(&preview.to), "Payment reminder prepared");
    Ok(Json(json!({
        "emailPreview": preview,
        "message": format!("Payment reminder prepared for {}", preview.to),
    })))
}
