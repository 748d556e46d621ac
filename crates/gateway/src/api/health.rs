use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /health` — liveness probe. Always returns 200 once the process is
/// serving requests; does not touch either store.
pub async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// `GET /ready` — readiness probe. Returns 200 only if both stores accept a
/// trivial query, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let operational_ok = state.operational.lookup_teacher("__readiness_probe__").await.is_ok();
    let analytical_ok = state
        .analytical
        .get_by_summary_id(-1)
        .await
        .is_ok();

    if operational_ok && analytical_ok {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not_ready",
                "operational": operational_ok,
                "analytical": analytical_ok,
            })),
        )
    }
}
