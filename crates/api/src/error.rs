//! Maps the crate-level error taxonomies onto HTTP responses.
//!
//! Per spec §7: `ValidationError`/`StateConflict` -> 4xx with the
//! accumulated messages, `NotFound` -> 404, `UpstreamFailure`/anything
//! else -> 500 with a short cause logged at `error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<db::DbError> for ApiError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::NotFound => ApiError::not_found("resource not found"),
            other => ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: other.to_string() },
        }
    }
}

impl From<engine::EngineError> for ApiError {
    fn from(err: engine::EngineError) -> Self {
        match err {
            engine::EngineError::Validation(errors) => ApiError::bad_request(errors.join("; ")),
            engine::EngineError::NotFound(what) => ApiError::not_found(what),
            engine::EngineError::StateConflict { operation, observed_status } => {
                ApiError::bad_request(format!("cannot {operation} while execution is {observed_status}"))
            }
            engine::EngineError::UpstreamFailure(cause) => {
                ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: cause }
            }
            engine::EngineError::Database(db_err) => ApiError::from(db_err),
            other => ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: other.to_string() },
        }
    }
}

impl From<runtime::RuntimeError> for ApiError {
    fn from(err: runtime::RuntimeError) -> Self {
        ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: err.to_string() }
    }
}
