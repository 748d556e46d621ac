pub mod exercises;
pub mod health;
pub mod lesson_status;
pub mod trigger;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Builds the full HTTP surface: liveness/readiness probes plus the
/// trigger/status/exercises endpoints described in the pipeline contract.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/v1/trigger", post(trigger::trigger))
        .route("/v1/lesson-status/:summary_id", get(lesson_status::lesson_status))
        .route("/v1/exercises", get(exercises::list_exercises))
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use ll_domain::error::Error;

/// Standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Maps a domain error to the client-facing status codes from the pipeline
/// contract: `Validation` → 400, `NotFound` → 404, `Conflict` → 409,
/// everything else → 500. The 500 case never writes the underlying error
/// into the response body — only a correlation id a client can report back,
/// with the real error logged server-side against that same id.
pub(crate) fn error_response(error: Error) -> Response {
    match error {
        Error::Validation(message) => api_error(StatusCode::BAD_REQUEST, message),
        Error::NotFound(message) => api_error(StatusCode::NOT_FOUND, message),
        Error::Conflict(message) => api_error(StatusCode::CONFLICT, message),
        other => {
            let correlation_id = uuid::Uuid::new_v4().to_string();
            tracing::error!(error = %other, correlation_id = %correlation_id, "internal error handling request");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("internal error, reference {correlation_id}"),
            )
        }
    }
}
