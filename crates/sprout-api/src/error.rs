//! Error-to-response mapping.
//!
//! Handlers return [`ApiResult`]; the `?` operator lifts any
//! [`sprout_core::Error`] into [`ApiError`], which serializes the
//! `{"error": "..."}` envelope. Internal failures log their detail here and
//! respond with the generic message only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sprout_core::Error;

/// Wrapper that carries a core error out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

/// Handler result type.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// The HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Upstream { .. } | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_internal() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = %status, "request rejected");
        }
        let body = Json(json!({ "error": self.0.public_message() }));
        (status, body).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
