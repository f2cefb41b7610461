//! Mapping of coordination errors onto HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cosign_errors::Error;
use cosign_types::api::ErrorResponse;
use tracing::debug;

/// Result type for request handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A coordination error on its way back to the caller
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

// Extractor failures are caller mistakes in the request shape, so they are
// reported as validation errors rather than axum's default statuses.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = StatusCode::from_u16(self.0.code()).unwrap_or(StatusCode::BAD_REQUEST);

        debug!(%kind, error = %self.0, "request rejected");
        cosign_telemetry::record_rejection(kind.as_str());

        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
