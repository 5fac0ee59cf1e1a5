//! `GET /api/quiz`: random quiz selection.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::parse_limit;
use super::state::AppState;

/// Query parameters for quiz selection.
#[derive(Debug, Default, Deserialize)]
pub struct QuizQuery {
    pub category: Option<String>,
    pub limit: Option<String>,
}

/// Up to `limit` random quizzes, optionally from one category.
#[instrument(skip(state))]
pub async fn list_quizzes(State(state): State<AppState>, Query(query): Query<QuizQuery>) -> Response {
    let limit = parse_limit(query.limit.as_deref());
    let quizzes = state.catalog.sample(query.category.as_deref(), limit);

    debug!(count = quizzes.len(), "Selected quizzes");
    Json(json!({
        "success": true,
        "count": quizzes.len(),
        "data": quizzes,
    }))
    .into_response()
}
