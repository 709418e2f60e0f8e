use api_shared::ErrorRes;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracker_core::TrackerError;

/// Error returned by REST handlers.
///
/// Validation failures become `400` with the validation code and message. Storage failures
/// become `500` with a generic body; the underlying cause is only logged.
#[derive(Debug)]
pub enum ApiError {
    Tracker(TrackerError),
    BadBody(JsonRejection),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        ApiError::Tracker(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Tracker(TrackerError::Validation(err)) => {
                tracing::debug!("Rejected scan: {}", err);
                (StatusCode::BAD_REQUEST, ErrorRes::from(&err))
            }
            ApiError::Tracker(err) => {
                tracing::error!("Storage error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorRes::database_unavailable(),
                )
            }
            ApiError::BadBody(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorRes::new("Invalid request", rejection.body_text()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
