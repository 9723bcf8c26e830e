use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};

use flighthub_core::{Booking, NewBooking};

use crate::error::AppError;
use crate::extract::{Path, ValidatedJson};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{reference}", get(get_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.services.bookings.create(input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.services.bookings.get_by_reference(&reference).await?;
    Ok(Json(booking))
}
