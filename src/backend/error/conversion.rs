/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse`, so handlers can return it
 * directly. Error responses are JSON:
 *
 * ```json
 * {
 *   "error": "Conversation not found",
 *   "status": 404
 * }
 * ```
 *
 * Extractor rejections and middleware failures (the request deadline) are
 * converted here too, so no response escapes the JSON shape.
 */

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// Malformed JSON bodies are reported as 400 in the usual error shape
impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        BackendError::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Malformed query strings get the same treatment
impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        BackendError::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Turn errors raised by the middleware stack into JSON responses.
///
/// Used with `HandleErrorLayer`; an elapsed request deadline becomes 408.
pub async fn handle_middleware_error(err: BoxError) -> BackendError {
    if err.is::<tower::timeout::error::Elapsed>() {
        BackendError::handler(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    } else {
        BackendError::handler(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled middleware error: {}", err),
        )
    }
}
