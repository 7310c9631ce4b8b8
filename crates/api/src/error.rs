//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking::BookingError;

/// API-level error type that maps to HTTP responses.
///
/// The body is `{"error": <message>, "kind": <kind>}`, where `kind` is the
/// stable name of the booking failure so clients can branch on it.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl ApiError {
    /// Returns the HTTP status for the wrapped failure.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::InvalidRequest(_) | BookingError::RoomTypeMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            BookingError::IneligibleUser { .. } => StatusCode::FORBIDDEN,
            BookingError::UserNotFound(_)
            | BookingError::HotelOrRoomNotFound { .. }
            | BookingError::BookingNotFound(_)
            | BookingError::WaitlistEntryNotFound(_) => StatusCode::NOT_FOUND,
            BookingError::RoomNotAvailable { .. } | BookingError::BookingCancelled(_) => {
                StatusCode::CONFLICT
            }
            BookingError::DirectoryFailure(_)
            | BookingError::InventoryQueryFailure(_)
            | BookingError::InventorySyncFailure { .. }
            | BookingError::InventoryReleaseFailure { .. }
            | BookingError::RateLookupFailure { .. } => StatusCode::BAD_GATEWAY,
            BookingError::ReservationTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BookingError::PersistenceFailure(_) | BookingError::NotificationFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError(err)
    }
}
