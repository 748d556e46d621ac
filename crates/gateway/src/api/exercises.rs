use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use ll_domain::models::ExerciseSet;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{api_error, error_response};

#[derive(Debug, Deserialize)]
pub struct ExercisesQuery {
    class_id: String,
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExercisesResponse {
    count: usize,
    exercises: Vec<ExerciseSet>,
}

/// `GET /v1/exercises?class_id=&user_id=` — approved and pending exercise
/// sets for a class, newest first. `user_id` narrows to one student.
pub async fn list_exercises(State(state): State<AppState>, Query(query): Query<ExercisesQuery>) -> Response {
    if query.class_id.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "class_id is required");
    }

    let sets = state
        .analytical
        .exercise_sets_for_class(&query.class_id, query.user_id.as_deref())
        .await;

    match sets {
        Ok(exercises) => (
            StatusCode::OK,
            Json(ExercisesResponse {
                count: exercises.len(),
                exercises,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
