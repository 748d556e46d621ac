use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ll_domain::models::DispatchPayload;
use ll_domain::trace::TraceEvent;
use ll_stores::NewArtifact;

use crate::idempotency::CachedResponse;
use crate::state::AppState;

use super::{api_error, error_response};

#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub user_id: String,
    pub teacher_id: String,
    pub class_id: String,
    #[serde(default)]
    pub teacher_email: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize)]
struct PollUrls {
    status: String,
    exercises: String,
}

#[derive(Debug, Serialize)]
struct TriggerResponse {
    summary_id: i64,
    status: &'static str,
    class_id: String,
    date: String,
    poll_urls: PollUrls,
}

/// `POST /v1/trigger` — idempotently registers a transcript as ready for
/// exercise generation. Safe to call more than once for the same
/// `(class_id, date, start_time)`: repeats return the existing row instead
/// of creating a second one. A repeat for the same business key but a
/// different `user_id` is rejected as an incompatible duplicate.
pub async fn trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TriggerRequest>,
) -> Response {
    if req.class_id.trim().is_empty() || req.user_id.trim().is_empty() || req.teacher_id.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "class_id, user_id, and teacher_id are required");
    }

    let idempotency_key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(key) = &idempotency_key {
        if let Some(cached) = state.idempotency.get(key) {
            return (
                StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK),
                Json(cached.body),
            )
                .into_response();
        }
    }

    let new_artifact = NewArtifact {
        user_id: req.user_id.clone(),
        teacher_id: req.teacher_id.clone(),
        class_id: req.class_id.clone(),
        teacher_email: req.teacher_email.clone(),
        meeting_date: req.date,
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
    };

    let (artifact, created) = match state.analytical.find_or_insert_pending(new_artifact).await {
        Ok(result) => result,
        Err(e) => return error_response(e),
    };

    if !created && artifact.teacher_email != req.teacher_email {
        return api_error(
            StatusCode::CONFLICT,
            "an artifact for this class/date/start_time already exists with a different teacher_email",
        );
    }

    // Only the call that actually creates the row forwards to the external
    // workflow — idempotent retries observe the existing row without
    // re-dispatching. The webhook side still collapses on Idempotency-Key
    // if this ever races with the class monitor's own dispatch.
    if created {
        let dispatch_payload = DispatchPayload {
            user_id: artifact.user_id.clone(),
            teacher_id: artifact.teacher_id.clone(),
            class_id: artifact.class_id.clone(),
            date: artifact.meeting_date.to_string(),
            start_time: artifact.start_time.clone(),
            end_time: artifact.end_time.clone(),
            teacher_email: artifact.teacher_email.clone(),
        };
        let key = dispatch_payload.idempotency_key();
        match state.dispatch.dispatch(&dispatch_payload, &key).await {
            ll_dispatch::DispatchOutcome::Success { status } => {
                TraceEvent::ClassDispatched {
                    class_id: artifact.class_id.clone(),
                    idempotency_key: key,
                    status,
                }
                .emit();
            }
            ll_dispatch::DispatchOutcome::Retryable { reason } => {
                TraceEvent::DispatchFailed {
                    class_id: artifact.class_id.clone(),
                    retryable: true,
                    reason,
                    payload_digest: None,
                }
                .emit();
            }
            ll_dispatch::DispatchOutcome::Permanent { reason } => {
                TraceEvent::DispatchFailed {
                    class_id: artifact.class_id.clone(),
                    retryable: false,
                    reason,
                    payload_digest: Some(dispatch_payload.payload_digest()),
                }
                .emit();
            }
        }
    }

    let body = TriggerResponse {
        summary_id: artifact.summary_id,
        status: artifact.status.as_str(),
        class_id: artifact.class_id.clone(),
        date: artifact.meeting_date.to_string(),
        poll_urls: PollUrls {
            status: format!("/v1/lesson-status/{}", artifact.summary_id),
            exercises: format!("/v1/exercises?class_id={}", artifact.class_id),
        },
    };
    let body_json = serde_json::to_value(&body).unwrap_or_default();
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };

    if let Some(key) = idempotency_key {
        state.idempotency.insert(
            key,
            CachedResponse {
                status: status.as_u16(),
                body: body_json.clone(),
            },
        );
    }

    (status, Json(body_json)).into_response()
}
