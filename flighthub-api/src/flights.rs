use axum::{extract::State, routing::get, Json, Router};

use flighthub_booking::FlightSearch;
use flighthub_core::Flight;

use crate::error::AppError;
use crate::extract::{Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/{id}", get(get_flight))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightSearch>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = state.services.catalog.search(&query).await?;
    Ok(Json(flights))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.services.catalog.get_by_id(id).await?;
    Ok(Json(flight))
}
