use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::state::AppState;

use super::{api_error, error_response};

#[derive(Debug, Serialize)]
struct LessonStatusResponse {
    summary_id: i64,
    status: &'static str,
    processing_attempts: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
    exercises_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    exercises_id: Option<String>,
    transcript_available: bool,
    transcript_length: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    processed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// `GET /v1/lesson-status/:summary_id` — a read-only snapshot of one
/// transcript's lifecycle, for clients polling after `/v1/trigger`.
pub async fn lesson_status(State(state): State<AppState>, Path(summary_id): Path<i64>) -> Response {
    let artifact = match state.analytical.get_by_summary_id(summary_id).await {
        Ok(Some(artifact)) => artifact,
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "unknown summary_id"),
        Err(e) => return error_response(e),
    };

    let exercise_set = match state.analytical.exercise_set_for_summary(summary_id).await {
        Ok(set) => set,
        Err(e) => return error_response(e),
    };

    let body = LessonStatusResponse {
        summary_id: artifact.summary_id,
        status: artifact.status.as_str(),
        processing_attempts: artifact.processing_attempts,
        last_error: artifact.last_error,
        exercises_generated: exercise_set.is_some(),
        exercises_id: exercise_set.map(|set| set.id.to_string()),
        transcript_available: artifact.transcript.is_some(),
        transcript_length: artifact.transcript_length,
        processed_at: artifact.processed_at,
    };

    (StatusCode::OK, Json(body)).into_response()
}
