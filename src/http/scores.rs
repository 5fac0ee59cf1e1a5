//! `POST /api/score` and `GET /api/ranking`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use super::messages;
use super::state::AppState;
use super::{error_response, parse_limit};
use crate::error::ScamguardError;
use crate::quiz::ScoreSubmission;

/// Validate a raw score body. Errors carry the message returned to the client.
pub fn parse_score_submission(body: &Value) -> Result<ScoreSubmission, &'static str> {
    let field = |name: &str| body.get(name).filter(|v| !v.is_null());

    let session_id = field("sessionId");
    let category = field("category");
    let score = field("score");
    let correct_count = field("correctCount");
    let total_count = field("totalCount");

    let present_text = |v: Option<&Value>| v.is_some_and(|v| v.as_str() != Some(""));
    if !present_text(session_id)
        || !present_text(category)
        || score.is_none()
        || correct_count.is_none()
        || total_count.is_none()
    {
        return Err(messages::MISSING_FIELDS);
    }

    let as_int = |v: Option<&Value>| v.and_then(Value::as_i64).and_then(|n| i32::try_from(n).ok());
    match (
        session_id.and_then(Value::as_str),
        category.and_then(Value::as_str),
        as_int(score),
        as_int(correct_count),
        as_int(total_count),
    ) {
        (Some(session_id), Some(category), Some(score), Some(correct_count), Some(total_count)) => {
            Ok(ScoreSubmission {
                session_id: session_id.to_string(),
                category: category.to_string(),
                score,
                correct_count,
                total_count,
            })
        }
        _ => Err(messages::INVALID_FIELD_TYPES),
    }
}

/// Record a finished quiz run.
#[instrument(skip(state, body))]
pub async fn submit_score(State(state): State<AppState>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, messages::INVALID_JSON),
    };

    let submission = match parse_score_submission(&body) {
        Ok(s) => s,
        Err(message) => {
            debug!(reason = message, "Rejected score submission");
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    match state.leaderboard.insert(submission).await {
        Ok(row) => {
            info!(id = row.id, category = %row.category, score = row.score, "Score saved");
            (StatusCode::OK, Json(json!({ "success": true, "data": row }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Score save failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, messages::SCORE_SAVE_FAILED)
        }
    }
}

/// Query parameters for the ranking view.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQuery {
    pub category: Option<String>,
    pub session_id: Option<String>,
    pub limit: Option<String>,
}

/// Top scores, the caller's personal bests, and per-category statistics.
#[instrument(skip(state))]
pub async fn ranking(State(state): State<AppState>, Query(query): Query<RankingQuery>) -> Response {
    let limit = parse_limit(query.limit.as_deref());
    let board = &state.leaderboard;

    let result = async {
        let top_scores = board.top_scores(query.category.as_deref(), limit).await?;
        let my_best_scores = match query.session_id.as_deref().filter(|s| !s.is_empty()) {
            Some(session_id) => Some(board.best_scores(session_id).await?),
            None => None,
        };
        let category_stats = board.category_stats().await?;
        Ok::<_, ScamguardError>(json!({
            "topScores": top_scores,
            "myBestScores": my_best_scores,
            "categoryStats": category_stats,
        }))
    }
    .await;

    match result {
        Ok(data) => (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response(),
        Err(e) => {
            error!(error = %e, "Ranking fetch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, messages::RANKING_FETCH_FAILED)
        }
    }
}
