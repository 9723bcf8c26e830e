use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flighthub_booking::BookingError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    /// Body, path or query string that could not be parsed at all.
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::BadRequest(msg) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
            }
            AppError::Booking(err) => err,
        };

        let message = err.user_message();
        let (status, body) = match err {
            BookingError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation error", "details": details }),
            ),
            BookingError::NotFound(what) => {
                (StatusCode::NOT_FOUND, json!({ "error": format!("{what} not found") }))
            }
            BookingError::InvalidState { reference, status } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "code": "invalid_state",
                    "reference": reference,
                    "status": status,
                }),
            ),
            BookingError::Expired { reference, expires_at } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "code": "expired",
                    "reference": reference,
                    "expiresAt": expires_at,
                }),
            ),
            BookingError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
